//! The incremental HTTP/1.x message state machine.
//!
//! A dense byte-at-a-time state machine, one private method per state
//! ([`Parser::step`] is the dispatch switch), each mutating `&mut self` and
//! returning `Result<()>` rather than threading an out-parameter through a
//! C-style integer status code.

use crate::callbacks::{CallbackResult, ParserCallbacks, CB_OK};
use crate::classify;
use crate::error::{ParserError, Result};
use crate::scratch::ScratchBuffer;
use crate::state::{HeaderState, State};
use libc::c_void;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const SPACE: u8 = b' ';

// Header/value literals tracked by the recognition sub-machine. Matching
// always starts one byte in, since the first byte is what selected the
// matching state to begin with.
const CON: &[u8] = b"con";
const CONNECTION: &[u8] = b"connection";
const CONTENT_LENGTH: &[u8] = b"content-length";
const TRANSFER_ENCODING: &[u8] = b"transfer-encoding";
const CHUNKED: &[u8] = b"chunked";
const KEEP_ALIVE: &[u8] = b"keep-alive";
const CLOSE: &[u8] = b"close";

/// Which half of an HTTP/1.x exchange a [`Parser`] reads.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
    Request,
    Response,
}

/// Bit flags carried across a single message, reset between messages.
///
/// Rendered as named associated constants over a `u8` rather than pulling
/// in the `bitflags` crate for five bits.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Flags(u8);

impl Flags {
    pub const CHUNKED: u8 = 1 << 0;
    pub const CONNECTION_KEEP_ALIVE: u8 = 1 << 1;
    pub const CONNECTION_CLOSE: u8 = 1 << 2;
    pub const SKIP_BODY: u8 = 1 << 3;
    /// Reserved: set once trailing headers after a chunked body are
    /// implemented. That is deliberately deferred for now; the flag exists
    /// so the bit position is stable when that lands.
    #[allow(dead_code)]
    pub const TRAILING: u8 = 1 << 4;

    fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }
}

/// The in-flight state of one HTTP/1.x message.
pub struct Parser {
    kind: Kind,
    state: State,
    header_state: HeaderState,
    /// Position within whichever well-known header name/value literal is
    /// currently being prefix matched.
    match_index: usize,
    flags: Flags,
    /// Bytes accumulated in the current token. Moves in lockstep with the
    /// scratch buffer's length; kept as its own counter because it is also
    /// the signal `read_header_value` uses to tell leading whitespace from
    /// in-progress content.
    bytes_read: usize,
    content_length: u64,
    http_major: u16,
    http_minor: u16,
    status_code: u16,
    scratch: ScratchBuffer,
    /// Opaque host context, preserved across `reset`. The host is
    /// responsible for whatever it points to; this crate never
    /// dereferences it.
    app_data: *mut c_void,
}

impl Parser {
    /// Allocates a scratch buffer and sets the initial state for `kind`.
    pub fn new(kind: Kind) -> Self {
        let state = match kind {
            Kind::Request => State::ReqStart,
            Kind::Response => State::RespStart,
        };
        Self {
            kind,
            state,
            header_state: HeaderState::General,
            match_index: 0,
            flags: Flags::default(),
            bytes_read: 0,
            content_length: 0,
            http_major: 0,
            http_minor: 0,
            status_code: 0,
            scratch: ScratchBuffer::new(),
            app_data: std::ptr::null_mut(),
        }
    }

    /// The opaque host context pointer, or null if never set.
    pub fn app_data(&self) -> *mut c_void {
        self.app_data
    }

    /// Sets the opaque host context pointer. The crate never reads through
    /// it; it is carried across message resets purely as a convenience so
    /// a host needn't re-attach per-connection context after every message.
    pub fn set_app_data(&mut self, ptr: *mut c_void) {
        self.app_data = ptr;
    }

    /// Request or response.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// HTTP major version of the in-flight (or just-completed) message.
    pub fn http_major(&self) -> u16 {
        self.http_major
    }

    /// HTTP minor version of the in-flight (or just-completed) message.
    pub fn http_minor(&self) -> u16 {
        self.http_minor
    }

    /// Response status code; `0` until parsed, or for request parsers.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Remaining (or total, once headers complete) content length.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Marks this parser's next response as carrying no body regardless of
    /// framing headers -- the host's way of telling the parser "this is the
    /// response to a HEAD request" (RFC 2616 §4.4), since the parser itself
    /// never sees the request method that produced a response.
    pub fn set_skip_body(&mut self, skip: bool) {
        if skip {
            self.flags.set(Flags::SKIP_BODY);
        } else {
            self.flags.0 &= !Flags::SKIP_BODY;
        }
    }

    /// Re-initializes all per-message fields to their starting values,
    /// preserving `app_data` and `kind`.
    pub fn reset(&mut self) {
        self.state = match self.kind {
            Kind::Request => State::ReqStart,
            Kind::Response => State::RespStart,
        };
        self.header_state = HeaderState::General;
        self.flags = Flags::default();
        self.content_length = 0;
        self.http_major = 0;
        self.http_minor = 0;
        self.status_code = 0;
        self.reset_token();
    }

    /// Clears the current token: scratch buffer, match index, and
    /// bytes-read counter. Called at every token boundary.
    fn reset_token(&mut self) {
        self.bytes_read = 0;
        self.match_index = 0;
        self.scratch.reset();
    }

    fn store(&mut self, byte: u8) -> Result<()> {
        self.bytes_read += 1;
        self.scratch.push(byte)
    }

    /// `true` once `F_CHUNKED` has been observed for this message.
    pub fn transfer_encoding_chunked(&self) -> bool {
        self.flags.contains(Flags::CHUNKED)
    }

    /// Whether neither content-length nor chunked framing bounds the body,
    /// so the connection's end would delimit it.
    pub fn message_needs_eof(&self) -> bool {
        if self.kind == Kind::Request {
            return false;
        }
        if self.status_code / 100 == 1
            || self.status_code == 204
            || self.status_code == 304
            || self.flags.contains(Flags::SKIP_BODY)
        {
            return false;
        }
        if self.flags.contains(Flags::CHUNKED) || self.content_length != u64::MAX {
            return false;
        }
        true
    }

    /// Whether the connection can be reused for another message after this
    /// one.
    pub fn should_keep_alive(&self) -> bool {
        if self.http_major > 0 && self.http_minor > 0 {
            if self.flags.contains(Flags::CONNECTION_CLOSE) {
                return false;
            }
        } else if !self.flags.contains(Flags::CONNECTION_KEEP_ALIVE) {
            return false;
        }
        !self.message_needs_eof()
    }

    /// Feeds `data` to the parser, invoking `callbacks` as boundaries are
    /// reached. On a clean consumption of every byte, returns `Ok(())`.
    /// On the first malformed byte, or the first callback abort, the
    /// parser is reset and the error is returned.
    pub fn execute<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        data: &[u8],
    ) -> Result<()> {
        match self.execute_inner(callbacks, data) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::debug!("http parser error: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    fn execute_inner<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        data: &[u8],
    ) -> Result<()> {
        let mut i = 0usize;
        while i < data.len() {
            match self.state {
                State::Body | State::ChunkData => {
                    let n = self.read_body(callbacks, &data[i..])?;
                    i += n;
                    self.reset_token();
                }
                _ => {
                    let byte = data[i];
                    self.step(callbacks, byte)?;
                    i += 1;
                }
            }

            if self.state == State::BodyComplete {
                log::trace!("message complete");
                let ret = callbacks.on_message_complete(self);
                self.reset();
                invoke(ret)?;
            }
        }
        Ok(())
    }

    fn step<C: ParserCallbacks + ?Sized>(&mut self, callbacks: &mut C, byte: u8) -> Result<()> {
        match self.state {
            State::ReqStart => self.start_request(callbacks, byte),
            State::ReqMethod => self.read_request_method(callbacks, byte),
            State::ReqPath => self.read_request_path(callbacks, byte),
            State::RespStart => self.start_response(callbacks, byte),
            State::RespStatus => self.read_response_status(callbacks, byte),
            State::RespRphrase => self.read_response_rphrase(byte),
            State::HttpVersionHead => self.read_http_version_head(byte),
            State::HttpVersionMajor => self.read_http_version_major(byte),
            State::HttpVersionMinor => self.read_http_version_minor(callbacks, byte),
            State::HeaderFieldStart => self.read_header_field_start(callbacks, byte),
            State::HeaderField => self.read_header_field(callbacks, byte),
            State::HeaderValue => self.read_header_value(callbacks, byte),
            State::ChunkSize => self.read_chunk_size(byte),
            State::ChunkParameters => self.read_chunk_parameters(byte),
            State::ChunkComplete => self.read_chunk_complete(byte),
            State::Body | State::ChunkData | State::BodyComplete => Err(ParserError::BadState),
        }
    }

    fn set_state(&mut self, state: State) {
        log::trace!("{:?} state -> {:?}", self.kind, state);
        self.state = state;
    }

    // -- Request line -------------------------------------------------

    fn start_request<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        match byte {
            CR | LF => Ok(()),
            _ => {
                self.set_state(State::ReqMethod);
                self.read_request_method(callbacks, byte)
            }
        }
    }

    fn read_request_method<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        if classify::is_alpha(byte) {
            return self.store(byte);
        }
        match byte {
            SPACE => {
                invoke(callbacks.on_req_method(self, self.scratch.as_slice()))?;
                self.reset_token();
                self.set_state(State::ReqPath);
                Ok(())
            }
            _ => Err(ParserError::BadMethod),
        }
    }

    fn read_request_path<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        if classify::is_url_char(byte) {
            return self.store(byte);
        }
        match byte {
            SPACE => {
                invoke(callbacks.on_req_path(self, self.scratch.as_slice()))?;
                self.reset_token();
                self.set_state(State::HttpVersionHead);
                Ok(())
            }
            _ => Err(ParserError::BadPathCharacter),
        }
    }

    // -- Status line ----------------------------------------------------

    fn start_response<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        let _ = callbacks;
        match byte {
            CR | LF => Ok(()),
            _ => {
                self.set_state(State::HttpVersionHead);
                self.read_http_version_head(byte)
            }
        }
    }

    fn read_response_status<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        if classify::is_num(byte) {
            let digit = (byte - b'0') as u16;
            let t = self.status_code.wrapping_mul(10).wrapping_add(digit);
            if t < self.status_code || t == u16::MAX {
                return Err(ParserError::BadStatusCode);
            }
            self.status_code = t;
            return Ok(());
        }
        match byte {
            SPACE => {
                invoke(callbacks.on_status(self))?;
                self.set_state(State::RespRphrase);
                Ok(())
            }
            _ => Err(ParserError::BadStatusCode),
        }
    }

    fn read_response_rphrase(&mut self, byte: u8) -> Result<()> {
        if byte == LF {
            self.set_state(State::HeaderFieldStart);
        }
        Ok(())
    }

    // -- Version ----------------------------------------------------------

    fn read_http_version_head(&mut self, byte: u8) -> Result<()> {
        if byte == b'/' {
            self.set_state(State::HttpVersionMajor);
        } else if !classify::is_alpha(byte) {
            return Err(ParserError::BadHttpVersionHead);
        }
        Ok(())
    }

    fn read_http_version_major(&mut self, byte: u8) -> Result<()> {
        if classify::is_num(byte) {
            let digit = (byte - b'0') as u16;
            self.http_major = self.http_major.wrapping_mul(10).wrapping_add(digit);
            if self.http_major > 999 {
                return Err(ParserError::BadHttpVersionMajor);
            }
            return Ok(());
        }
        match byte {
            b'.' => {
                self.set_state(State::HttpVersionMinor);
                Ok(())
            }
            // Every other terminator here (including CR/LF) is reported
            // through the path-character error rather than a
            // version-specific one.
            _ => Err(ParserError::BadPathCharacter),
        }
    }

    fn read_http_version_minor<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        if classify::is_num(byte) {
            let digit = (byte - b'0') as u16;
            self.http_minor = self.http_minor.wrapping_mul(10).wrapping_add(digit);
            if self.http_minor > 999 {
                return Err(ParserError::BadHttpVersionMinor);
            }
            return Ok(());
        }
        match self.kind {
            Kind::Request => match byte {
                CR => Ok(()),
                LF => {
                    invoke(callbacks.on_http_version(self))?;
                    self.reset_token();
                    self.set_state(State::HeaderFieldStart);
                    Ok(())
                }
                _ => Err(ParserError::BadPathCharacter),
            },
            Kind::Response => match byte {
                SPACE => {
                    invoke(callbacks.on_http_version(self))?;
                    self.reset_token();
                    self.set_state(State::RespStatus);
                    Ok(())
                }
                _ => Err(ParserError::BadPathCharacter),
            },
        }
    }

    // -- Headers ------------------------------------------------------------

    fn read_header_field_start<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        let lower = classify::lower(byte);
        match lower {
            b'c' => {
                self.store(byte)?;
                self.set_state(State::HeaderField);
                self.header_state = HeaderState::MatchingCon;
                Ok(())
            }
            b't' => {
                self.store(byte)?;
                self.set_state(State::HeaderField);
                self.header_state = HeaderState::MatchingTransferEncoding;
                Ok(())
            }
            _ => {
                self.set_state(State::HeaderField);
                self.read_header_field(callbacks, byte)
            }
        }
    }

    fn read_header_field<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        match byte {
            CR => Ok(()),
            LF => {
                invoke(callbacks.on_headers_complete(self))?;
                self.route_to_body();
                Ok(())
            }
            b':' => {
                invoke(callbacks.on_header_field(self, self.scratch.as_slice()))?;
                self.reset_token();
                self.set_state(State::HeaderValue);
                Ok(())
            }
            _ => {
                let lower = classify::lower(byte);
                self.read_header_field_by_state(byte, lower)
            }
        }
    }

    fn route_to_body(&mut self) {
        if self.flags.contains(Flags::CHUNKED) {
            self.set_state(State::ChunkSize);
        } else if self.content_length > 0 {
            self.set_state(State::Body);
        } else {
            self.set_state(State::BodyComplete);
        }
    }

    fn read_header_field_by_state(&mut self, byte: u8, lower: u8) -> Result<()> {
        match self.header_state {
            HeaderState::MatchingTransferEncoding => {
                self.match_index += 1;
                if self.match_index >= TRANSFER_ENCODING.len()
                    || lower != TRANSFER_ENCODING[self.match_index]
                {
                    self.header_state = HeaderState::General;
                } else if self.match_index == TRANSFER_ENCODING.len() - 1 {
                    self.header_state = HeaderState::TransferEncoding;
                }
                self.store(byte)
            }
            HeaderState::MatchingCon => {
                self.match_index += 1;
                if self.match_index < CON.len() && lower != CON[self.match_index] {
                    self.header_state = HeaderState::General;
                } else if self.match_index == CON.len() {
                    self.header_state = match lower {
                        b't' => HeaderState::MatchingContentLength,
                        b'n' => HeaderState::MatchingConnection,
                        _ => HeaderState::General,
                    };
                }
                self.store(byte)
            }
            HeaderState::MatchingContentLength => {
                self.match_index += 1;
                if self.match_index >= CONTENT_LENGTH.len()
                    || lower != CONTENT_LENGTH[self.match_index]
                {
                    self.header_state = HeaderState::General;
                } else if self.match_index == CONTENT_LENGTH.len() - 1 {
                    self.header_state = HeaderState::ContentLength;
                }
                self.store(byte)
            }
            HeaderState::MatchingConnection => {
                self.match_index += 1;
                if self.match_index >= CONNECTION.len() || lower != CONNECTION[self.match_index] {
                    self.header_state = HeaderState::General;
                } else if self.match_index == CONNECTION.len() - 1 {
                    self.header_state = HeaderState::Connection;
                }
                self.store(byte)
            }
            _ => {
                if classify::token(byte) == 0 {
                    Err(ParserError::BadHeaderToken)
                } else {
                    self.store(byte)
                }
            }
        }
    }

    fn read_header_value<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        byte: u8,
    ) -> Result<()> {
        match byte {
            CR => Ok(()),
            LF => {
                invoke(callbacks.on_header_value(self, self.scratch.as_slice()))?;
                self.reset_token();
                self.set_state(State::HeaderFieldStart);
                self.header_state = HeaderState::General;
                Ok(())
            }
            b'\t' | SPACE if self.bytes_read == 0 => Ok(()),
            _ => self.process_header_value_by_state(byte),
        }
    }

    fn process_header_value_by_state(&mut self, byte: u8) -> Result<()> {
        let lower = classify::lower(byte);
        match self.header_state {
            HeaderState::TransferEncoding => {
                self.header_state = if lower == b'c' {
                    HeaderState::MatchingTransferEncodingChunked
                } else {
                    HeaderState::General
                };
                self.store(byte)
            }
            HeaderState::Connection => {
                self.header_state = match lower {
                    b'k' => HeaderState::MatchingConnectionKeepAlive,
                    b'c' => HeaderState::MatchingConnectionClose,
                    _ => HeaderState::General,
                };
                self.store(byte)
            }
            HeaderState::MatchingTransferEncodingChunked => {
                self.match_index += 1;
                if self.match_index >= CHUNKED.len() || lower != CHUNKED[self.match_index] {
                    self.header_state = HeaderState::General;
                } else if self.match_index == CHUNKED.len() - 1 {
                    self.flags.set(Flags::CHUNKED);
                }
                self.store(byte)
            }
            HeaderState::MatchingConnectionKeepAlive => {
                self.match_index += 1;
                if self.match_index >= KEEP_ALIVE.len() || lower != KEEP_ALIVE[self.match_index] {
                    self.header_state = HeaderState::General;
                } else if self.match_index == KEEP_ALIVE.len() - 1 {
                    self.flags.set(Flags::CONNECTION_KEEP_ALIVE);
                }
                self.store(byte)
            }
            HeaderState::MatchingConnectionClose => {
                self.match_index += 1;
                if self.match_index >= CLOSE.len() || lower != CLOSE[self.match_index] {
                    self.header_state = HeaderState::General;
                } else if self.match_index == CLOSE.len() - 1 {
                    self.flags.set(Flags::CONNECTION_CLOSE);
                }
                self.store(byte)
            }
            HeaderState::ContentLength => {
                if !classify::is_num(byte) {
                    return Err(ParserError::BadContentLength);
                }
                let digit = (byte - b'0') as u64;
                let t = self.content_length.wrapping_mul(10).wrapping_add(digit);
                if t < self.content_length || t == u64::MAX {
                    return Err(ParserError::BadContentLength);
                }
                self.content_length = t;
                self.store(byte)
            }
            _ => self.store(byte),
        }
    }

    // -- Body / chunked transfer coding -------------------------------------

    fn read_chunk_size(&mut self, byte: u8) -> Result<()> {
        match byte {
            CR => Ok(()),
            LF => {
                if self.content_length == 0 {
                    // Trailing headers after the final chunk are consumed
                    // and discarded rather than emitted.
                    self.set_state(State::BodyComplete);
                } else {
                    self.set_state(State::ChunkData);
                }
                Ok(())
            }
            b';' | SPACE => {
                self.set_state(State::ChunkParameters);
                Ok(())
            }
            _ => match classify::unhex(byte) {
                None => Err(ParserError::BadChunkSize),
                Some(value) => {
                    let t = self
                        .content_length
                        .wrapping_mul(16)
                        .wrapping_add(value as u64);
                    if t < self.content_length || t == u64::MAX {
                        Err(ParserError::BadContentLength)
                    } else {
                        self.content_length = t;
                        Ok(())
                    }
                }
            },
        }
    }

    fn read_chunk_parameters(&mut self, byte: u8) -> Result<()> {
        match byte {
            CR => Ok(()),
            LF => {
                if self.content_length == 0 {
                    self.set_state(State::BodyComplete);
                } else {
                    self.set_state(State::ChunkData);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn read_chunk_complete(&mut self, byte: u8) -> Result<()> {
        match byte {
            CR => Ok(()),
            LF => {
                self.set_state(State::ChunkSize);
                Ok(())
            }
            _ => Err(ParserError::BadDataAfterChunk),
        }
    }

    /// Consumes as much of `data` as `content_length` allows (or all of
    /// `data`, if shorter), emitting one `on_body` call, and returns the
    /// number of bytes consumed. Grounded in `read_body` in the original
    /// source.
    fn read_body<C: ParserCallbacks + ?Sized>(
        &mut self,
        callbacks: &mut C,
        data: &[u8],
    ) -> Result<usize> {
        let n = (self.content_length as usize).min(data.len());
        invoke(callbacks.on_body(self, &data[..n]))?;
        self.content_length -= n as u64;
        if self.content_length == 0 {
            self.set_state(if self.state == State::ChunkData {
                State::ChunkComplete
            } else {
                State::BodyComplete
            });
        }
        Ok(n)
    }
}

fn invoke(ret: CallbackResult) -> Result<()> {
    if ret == CB_OK {
        Ok(())
    } else {
        Err(ParserError::CallbackAbort(ret))
    }
}
