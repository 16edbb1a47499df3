//! Stable, wire-visible error codes for the parser.
//!
//! The numeric discriminants are part of the public contract: a C caller
//! linking against the `cdylib`/`staticlib` build sees the same integers
//! throughout, and a Rust caller gets a real [`std::error::Error`] with a
//! human-readable [`std::fmt::Display`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ParserError>;

/// A parse failure or host-signalled abort.
///
/// Every parse error is immediate and fatal for the in-flight message:
/// [`crate::parser::Parser::execute`] returns the error, resets the parser,
/// and the caller is expected to drop the connection. There is no
/// resynchronization strategy for HTTP/1.x framing.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParserError {
    /// A callback returned a nonzero status, signalling a host-initiated
    /// abort. Carries the host's own return value through verbatim, the
    /// way `http_parser_exec` passes a callback's `retval` straight back to
    /// its own caller rather than folding it into the fixed taxonomy below.
    #[error("host callback aborted parsing with code {0}")]
    CallbackAbort(i32),
    /// Reserved for an unrecognized parser type. `Parser::new` takes a
    /// [`crate::parser::Kind`], which makes this unconstructible from safe
    /// Rust; kept because the C ABI's `PbufHttpParserType` accepts a
    /// caller-supplied discriminant and `ELERR_BAD_PARSER_TYPE` is part of
    /// the stable code list this enum mirrors.
    #[error("unrecognized parser type")]
    BadParserType,
    /// The parser landed in a state not covered by `execute`'s dispatch.
    #[error("parser reached an invalid internal state")]
    BadState,
    /// A byte outside `IS_URL_CHAR` appeared while accumulating the request path.
    #[error("invalid character in request path")]
    BadPathCharacter,
    /// The `HTTP` literal preceding `/` in the version was malformed.
    #[error("invalid HTTP version head")]
    BadHttpVersionHead,
    /// The major version component overflowed or contained a non-digit.
    #[error("invalid HTTP major version")]
    BadHttpVersionMajor,
    /// The minor version component overflowed or contained a non-digit.
    #[error("invalid HTTP minor version")]
    BadHttpVersionMinor,
    /// A header field name contained a byte outside the RFC 2616 token set.
    #[error("invalid header token")]
    BadHeaderToken,
    /// The `Content-Length` (or chunk size) digit sequence overflowed `u64`.
    #[error("invalid or overflowing content length")]
    BadContentLength,
    /// A chunk size line contained a non-hex-digit byte.
    #[error("invalid chunk size")]
    BadChunkSize,
    /// The bytes following chunk data were not the expected `CRLF`.
    #[error("invalid data after chunk")]
    BadDataAfterChunk,
    /// The status code digit sequence overflowed `u16`.
    #[error("invalid or overflowing status code")]
    BadStatusCode,
    /// A byte outside `IS_ALPHA` appeared while accumulating the request method.
    #[error("invalid method")]
    BadMethod,
    /// A single token (method, path, header field, or header value) exceeded
    /// `HTTP_MAX_HEADER_SIZE`.
    #[error("scratch buffer overflow")]
    PbufferOverflow,
}

impl ParserError {
    /// The stable numeric code, for everything but a host abort, which
    /// carries the host's own code instead of a fixed sentinel.
    pub fn code(self) -> i32 {
        match self {
            ParserError::CallbackAbort(code) => code,
            ParserError::BadParserType => 2,
            ParserError::BadState => 3,
            ParserError::BadPathCharacter => 4,
            ParserError::BadHttpVersionHead => 5,
            ParserError::BadHttpVersionMajor => 6,
            ParserError::BadHttpVersionMinor => 7,
            ParserError::BadHeaderToken => 8,
            ParserError::BadContentLength => 9,
            ParserError::BadChunkSize => 10,
            ParserError::BadDataAfterChunk => 11,
            ParserError::BadStatusCode => 12,
            ParserError::BadMethod => 100,
            ParserError::PbufferOverflow => 1000,
        }
    }
}
