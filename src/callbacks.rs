//! The host callback contract.
//!
//! A single handler object polymorphic over the event set, rather than a
//! struct of `Option<fn(...)>` slots: a trait with a default (no-op)
//! implementation per event, so a host only overrides the events it cares
//! about.
//!
//! A nonzero return from any method aborts the in-flight
//! [`crate::parser::Parser::execute`] call, exactly as a nonzero return
//! from a C `http_cb`/`http_data_cb` does.

use crate::parser::Parser;

/// Return value used by callback methods: `0` to continue, nonzero to
/// abort the current `execute` call.
pub type CallbackResult = i32;

/// Continue parsing; the conventional "no objection" return value.
pub const CB_OK: CallbackResult = 0;

/// Host-supplied event sink for one in-flight message.
///
/// Every method has a no-op default, so a host implementing only, say,
/// `on_body` and `on_message_complete` does not need to mention the rest.
#[allow(unused_variables)]
pub trait ParserCallbacks {
    /// Reserved; invoked once before any other event for a message, ahead
    /// of the request/status line. May be left unused.
    fn on_message_begin(&mut self, parser: &Parser) -> CallbackResult {
        CB_OK
    }

    /// The request method token has been fully read (request parsers only).
    fn on_req_method(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        CB_OK
    }

    /// The raw request path/URI has been fully read, unparsed (request
    /// parsers only).
    fn on_req_path(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        CB_OK
    }

    /// `parser.http_major`/`parser.http_minor` have just been populated.
    fn on_http_version(&mut self, parser: &Parser) -> CallbackResult {
        CB_OK
    }

    /// `parser.status_code` has just been populated (response parsers only).
    fn on_status(&mut self, parser: &Parser) -> CallbackResult {
        CB_OK
    }

    /// A header field name, terminated by `:`, has been fully read.
    fn on_header_field(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        CB_OK
    }

    /// A header value, terminated by LF, has been fully read.
    fn on_header_value(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        CB_OK
    }

    /// The blank line terminating the header block has been reached.
    fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
        CB_OK
    }

    /// A contiguous run of body bytes is available. May be called more than
    /// once per message (once per chunk, or when `execute` is fed the body
    /// in multiple calls).
    fn on_body(&mut self, parser: &Parser, data: &[u8]) -> CallbackResult {
        CB_OK
    }

    /// The message has been fully consumed. `parser` still reflects the
    /// fields read during the just-finished message (`http_major`,
    /// `status_code`, ...); the parser is reset for the next message
    /// immediately after this callback returns -- see
    /// [`crate::parser::Parser::execute`].
    fn on_message_complete(&mut self, parser: &Parser) -> CallbackResult {
        CB_OK
    }
}

/// A callback sink that records nothing and always continues. Useful for
/// tests that only care about the parser's return status, or as a base to
/// wrap with `..Default::default()`-style composition in a host.
#[derive(Debug, Default)]
pub struct NullCallbacks;

impl ParserCallbacks for NullCallbacks {}
