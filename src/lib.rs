//! An incremental, byte-fed HTTP/1.x message parser and its companion
//! circular ring buffer.
//!
//! The parser never buffers a whole message: [`parser::Parser::execute`]
//! consumes whatever slice it is handed, driving a host-supplied
//! [`callbacks::ParserCallbacks`] as request/status lines, headers, and body
//! bytes come into view, and returns as soon as that slice is exhausted (or
//! a malformed byte is hit). [`buffer::RingBuffer`] is a separate, general
//! purpose growable circular byte buffer a host can use to stage data ahead
//! of a call to `execute` -- the two are independent; the parser never
//! allocates or touches a ring buffer itself.

pub mod buffer;
pub mod c_api;
pub mod callbacks;
pub mod classify;
pub mod error;
pub mod parser;
pub mod scratch;
pub mod state;

pub use buffer::RingBuffer;
pub use callbacks::{CallbackResult, NullCallbacks, ParserCallbacks, CB_OK};
pub use error::{ParserError, Result};
pub use parser::{Flags, Kind, Parser};
