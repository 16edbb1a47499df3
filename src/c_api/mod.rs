//! C ABI surface.
//!
//! Thin `#[no_mangle] extern "C"` wrappers delegating to the safe Rust
//! implementation, with `Option<unsafe extern "C" fn(...) -> i32>` as the
//! callback registration idiom: the host builds a [`PbufHttpSettings`]
//! table once and passes it to every `execute` call.

use crate::buffer::RingBuffer;
use crate::callbacks::{CallbackResult, ParserCallbacks, CB_OK};
use crate::parser::{Kind, Parser};
use libc::c_void;
use std::slice;

/// `http_cb`: invoked for events with no associated data.
pub type HttpCb = Option<unsafe extern "C" fn(parser: *const Parser) -> CallbackResult>;

/// `http_data_cb`: invoked for events carrying a borrowed byte span, valid
/// only for the duration of the call.
pub type HttpDataCb = Option<
    unsafe extern "C" fn(parser: *const Parser, at: *const u8, length: usize) -> CallbackResult,
>;

/// Mirrors `http_parser_settings`: a table of optional function pointers,
/// one slot per event. A host leaves a slot `None` to ignore that event.
#[repr(C)]
pub struct PbufHttpSettings {
    pub on_message_begin: HttpCb,
    pub on_req_method: HttpDataCb,
    pub on_req_path: HttpDataCb,
    pub on_http_version: HttpCb,
    pub on_status: HttpCb,
    pub on_header_field: HttpDataCb,
    pub on_header_value: HttpDataCb,
    pub on_headers_complete: HttpCb,
    pub on_body: HttpDataCb,
    pub on_message_complete: HttpCb,
}

/// Adapts a borrowed [`PbufHttpSettings`] table to [`ParserCallbacks`] so
/// [`Parser::execute`] can drive it directly. A `None` slot behaves as a
/// no-op that returns [`CB_OK`].
struct SettingsAdapter<'a>(&'a PbufHttpSettings);

impl<'a> ParserCallbacks for SettingsAdapter<'a> {
    fn on_message_begin(&mut self, parser: &Parser) -> CallbackResult {
        call_cb(self.0.on_message_begin, parser)
    }

    fn on_req_method(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        call_data_cb(self.0.on_req_method, parser, data)
    }

    fn on_req_path(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        call_data_cb(self.0.on_req_path, parser, data)
    }

    fn on_http_version(&mut self, parser: &Parser) -> CallbackResult {
        call_cb(self.0.on_http_version, parser)
    }

    fn on_status(&mut self, parser: &Parser) -> CallbackResult {
        call_cb(self.0.on_status, parser)
    }

    fn on_header_field(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        call_data_cb(self.0.on_header_field, parser, data)
    }

    fn on_header_value(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        call_data_cb(self.0.on_header_value, parser, data)
    }

    fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
        call_cb(self.0.on_headers_complete, parser)
    }

    fn on_body(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        call_data_cb(self.0.on_body, parser, data)
    }

    fn on_message_complete(&mut self, parser: &Parser) -> CallbackResult {
        call_cb(self.0.on_message_complete, parser)
    }
}

fn call_cb(cb: HttpCb, parser: &Parser) -> CallbackResult {
    match cb {
        Some(f) => unsafe { f(parser as *const Parser) },
        None => CB_OK,
    }
}

fn call_data_cb(cb: HttpDataCb, parser: &Parser, data: &[u8]) -> CallbackResult {
    match cb {
        Some(f) => unsafe { f(parser as *const Parser, data.as_ptr(), data.len()) },
        None => CB_OK,
    }
}

/// `enum http_parser_type`.
#[repr(C)]
pub enum PbufHttpParserType {
    Request = 0,
    Response = 1,
}

/// `http_parser_init`: allocates a parser of the given kind. The caller
/// owns the returned pointer and must release it with
/// [`pbuf_http_parser_free`].
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_new(parser_type: PbufHttpParserType) -> *mut Parser {
    let kind = match parser_type {
        PbufHttpParserType::Request => Kind::Request,
        PbufHttpParserType::Response => Kind::Response,
    };
    Box::into_raw(Box::new(Parser::new(kind)))
}

/// `free_http_parser`: releases a parser created by [`pbuf_http_parser_new`].
/// Passing `null` is a no-op; passing any other pointer not obtained from
/// `pbuf_http_parser_new` is undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_free(parser: *mut Parser) {
    if !parser.is_null() {
        drop(Box::from_raw(parser));
    }
}

/// Reads the opaque host data pointer last set with
/// [`pbuf_http_parser_set_app_data`], or null if never set.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_app_data(parser: *const Parser) -> *mut c_void {
    (*parser).app_data()
}

/// Stores an opaque host data pointer on the parser. Preserved across the
/// automatic reset that follows a completed message.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_set_app_data(parser: *mut Parser, app_data: *mut c_void) {
    (*parser).set_app_data(app_data);
}

/// Marks the next response this parser reads as bodyless regardless of
/// framing headers (the host's way of flagging "this answers a HEAD
/// request").
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_set_skip_body(parser: *mut Parser, skip: bool) {
    (*parser).set_skip_body(skip);
}

/// `http_parser_exec`: feeds `len` bytes at `data` to `parser`, invoking
/// whichever slots of `settings` are non-null. Returns `0` on clean
/// consumption, or the nonzero `HTTP_EL_ERROR` code (or, for a
/// host-initiated abort, the callback's own return value) otherwise.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_exec(
    parser: *mut Parser,
    settings: *const PbufHttpSettings,
    data: *const u8,
    len: usize,
) -> i32 {
    let slice = if data.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(data, len)
    };
    let mut adapter = SettingsAdapter(&*settings);
    match (*parser).execute(&mut adapter, slice) {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

/// `http_should_keep_alive`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_should_keep_alive(parser: *const Parser) -> bool {
    (*parser).should_keep_alive()
}

/// `http_transfer_encoding_chunked`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_transfer_encoding_chunked(parser: *const Parser) -> bool {
    (*parser).transfer_encoding_chunked()
}

/// Queries whether the message's framing leaves its end delimited only by
/// connection close.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_message_needs_eof(parser: *const Parser) -> bool {
    (*parser).message_needs_eof()
}

/// `parser->http_major`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_http_major(parser: *const Parser) -> u16 {
    (*parser).http_major()
}

/// `parser->http_minor`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_http_minor(parser: *const Parser) -> u16 {
    (*parser).http_minor()
}

/// `parser->status_code`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_status_code(parser: *const Parser) -> u16 {
    (*parser).status_code()
}

/// `parser->content_length`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_http_parser_content_length(parser: *const Parser) -> u64 {
    (*parser).content_length()
}

// -- Ring buffer ------------------------------------------------------------

/// `cbuf_new`: allocates a ring buffer of at least `size_hint` bytes
/// (`DEFAULT_CBUF_SIZE` if `size_hint` is `0`). Release with
/// [`pbuf_ring_buffer_free`].
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_new(size_hint: usize) -> *mut RingBuffer {
    Box::into_raw(Box::new(RingBuffer::new(size_hint)))
}

/// `cbuf_free`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_free(buf: *mut RingBuffer) {
    if !buf.is_null() {
        drop(Box::from_raw(buf));
    }
}

/// `cbuf_reset`.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_reset(buf: *mut RingBuffer) {
    (*buf).reset();
}

/// Total backing storage, in bytes.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_capacity(buf: *const RingBuffer) -> usize {
    (*buf).capacity()
}

/// Number of unread bytes currently staged.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_available(buf: *const RingBuffer) -> usize {
    (*buf).available()
}

/// `cbuf_put`: appends `len` bytes at `src`, growing the buffer first if
/// there isn't enough room.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_put(buf: *mut RingBuffer, src: *const u8, len: usize) {
    if src.is_null() || len == 0 {
        return;
    }
    (*buf).put(slice::from_raw_parts(src, len));
}

/// `cbuf_get`: copies up to `len` unread bytes into `dst`. Returns the
/// number of bytes copied; `0` on an empty buffer is not an error.
#[no_mangle]
pub unsafe extern "C" fn pbuf_ring_buffer_get(buf: *mut RingBuffer, dst: *mut u8, len: usize) -> usize {
    if dst.is_null() || len == 0 {
        return 0;
    }
    (*buf).get(slice::from_raw_parts_mut(dst, len))
}
