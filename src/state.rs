//! Primary and header-recognition sub-states.

/// Primary parser state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    ReqStart,
    ReqMethod,
    ReqPath,

    RespStart,
    RespStatus,
    RespRphrase,

    HttpVersionHead,
    HttpVersionMajor,
    HttpVersionMinor,

    HeaderFieldStart,
    HeaderField,
    HeaderValue,

    Body,
    ChunkSize,
    ChunkParameters,
    ChunkData,
    ChunkComplete,
    BodyComplete,
}

/// Header-recognition sub-state.
///
/// Tracks whether the field or value currently streaming is one of the
/// well-known headers (`Content-Length`, `Transfer-Encoding`,
/// `Connection`) without an intermediate hash-map lookup, by prefix
/// matching against the lower-cased name/value one byte at a time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderState {
    General,

    // Value-phase terminal states.
    ContentLength,
    Connection,
    TransferEncoding,

    // Field-name prefix matching.
    MatchingCon,
    MatchingContentLength,
    MatchingConnection,
    MatchingTransferEncoding,

    // Value prefix matching.
    MatchingConnectionKeepAlive,
    MatchingConnectionClose,
    MatchingTransferEncodingChunked,
}
