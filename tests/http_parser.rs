//! Scenario and property tests for the HTTP/1.x message parser.
//!
//! A recording `ParserCallbacks` implementation captures every event as a
//! `Vec<Event>`, driven through the public API and asserted on afterwards.

use pbuf_http::{CallbackResult, Kind, Parser, ParserCallbacks, ParserError, CB_OK};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    MessageBegin,
    ReqMethod(Vec<u8>),
    ReqPath(Vec<u8>),
    HttpVersion(u16, u16),
    Status(u16),
    HeaderField(Vec<u8>),
    HeaderValue(Vec<u8>),
    HeadersComplete,
    Body(Vec<u8>),
    MessageComplete,
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<Event>,
}

impl ParserCallbacks for Recorder {
    fn on_message_begin(&mut self, _parser: &Parser) -> CallbackResult {
        self.events.push(Event::MessageBegin);
        CB_OK
    }

    fn on_req_method(&mut self, _parser: &Parser, data: &[u8]) -> CallbackResult {
        self.events.push(Event::ReqMethod(data.to_vec()));
        CB_OK
    }

    fn on_req_path(&mut self, _parser: &Parser, data: &[u8]) -> CallbackResult {
        self.events.push(Event::ReqPath(data.to_vec()));
        CB_OK
    }

    fn on_http_version(&mut self, parser: &Parser) -> CallbackResult {
        self.events
            .push(Event::HttpVersion(parser.http_major(), parser.http_minor()));
        CB_OK
    }

    fn on_status(&mut self, parser: &Parser) -> CallbackResult {
        self.events.push(Event::Status(parser.status_code()));
        CB_OK
    }

    fn on_header_field(&mut self, _parser: &Parser, data: &[u8]) -> CallbackResult {
        self.events.push(Event::HeaderField(data.to_vec()));
        CB_OK
    }

    fn on_header_value(&mut self, _parser: &Parser, data: &[u8]) -> CallbackResult {
        self.events.push(Event::HeaderValue(data.to_vec()));
        CB_OK
    }

    fn on_headers_complete(&mut self, _parser: &Parser) -> CallbackResult {
        self.events.push(Event::HeadersComplete);
        CB_OK
    }

    fn on_body(&mut self, _parser: &Parser, data: &[u8]) -> CallbackResult {
        self.events.push(Event::Body(data.to_vec()));
        CB_OK
    }

    fn on_message_complete(&mut self, _parser: &Parser) -> CallbackResult {
        self.events.push(Event::MessageComplete);
        CB_OK
    }
}

// -- S1 -----------------------------------------------------------------

#[test]
fn s1_simple_get_emits_expected_callback_sequence() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    parser
        .execute(&mut rec, b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n")
        .unwrap();

    assert_eq!(
        rec.events,
        vec![
            Event::ReqMethod(b"GET".to_vec()),
            Event::ReqPath(b"/hello".to_vec()),
            Event::HttpVersion(1, 1),
            Event::HeaderField(b"Host".to_vec()),
            Event::HeaderValue(b"x".to_vec()),
            Event::HeadersComplete,
            Event::MessageComplete,
        ]
    );
}

// -- S2 -----------------------------------------------------------------

#[test]
fn s2_identity_body_is_delivered_and_content_length_resets() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    parser
        .execute(
            &mut rec,
            b"POST /u HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
        )
        .unwrap();

    assert!(rec.events.contains(&Event::Body(b"hello".to_vec())));
    assert_eq!(rec.events.last(), Some(&Event::MessageComplete));
    assert_eq!(parser.content_length(), 0);
}

// -- S3 -----------------------------------------------------------------

#[test]
fn s3_chunked_body_is_reassembled_into_one_on_body_call() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    parser
        .execute(
            &mut rec,
            b"POST /u HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        )
        .unwrap();

    let body_events: Vec<&Event> = rec
        .events
        .iter()
        .filter(|e| matches!(e, Event::Body(_)))
        .collect();
    assert_eq!(body_events, vec![&Event::Body(b"hello".to_vec())]);
    assert_eq!(rec.events.last(), Some(&Event::MessageComplete));
}

#[test]
fn chunked_body_is_reachable_on_the_response_path_too() {
    let mut parser = Parser::new(Kind::Response);
    let mut rec = Recorder::default();
    parser
        .execute(
            &mut rec,
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        )
        .unwrap();

    let body_events: Vec<&Event> = rec
        .events
        .iter()
        .filter(|e| matches!(e, Event::Body(_)))
        .collect();
    assert_eq!(body_events, vec![&Event::Body(b"hello".to_vec())]);
    assert_eq!(rec.events.last(), Some(&Event::MessageComplete));
}

// -- S4 -----------------------------------------------------------------

#[test]
fn s4_response_204_needs_no_eof() {
    let mut parser = Parser::new(Kind::Response);
    let mut rec = Recorder::default();
    parser
        .execute(&mut rec, b"HTTP/1.1 204 No Content\r\n\r\n")
        .unwrap();

    assert_eq!(
        rec.events,
        vec![
            Event::HttpVersion(1, 1),
            Event::Status(204),
            Event::HeadersComplete,
            Event::MessageComplete,
        ]
    );
}

#[test]
fn response_204_needs_eof_false_observed_at_headers_complete() {
    struct Observer {
        needs_eof_at_headers_complete: Option<bool>,
    }
    impl ParserCallbacks for Observer {
        fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
            self.needs_eof_at_headers_complete = Some(parser.message_needs_eof());
            CB_OK
        }
    }
    let mut parser = Parser::new(Kind::Response);
    let mut obs = Observer {
        needs_eof_at_headers_complete: None,
    };
    parser
        .execute(&mut obs, b"HTTP/1.1 204 No Content\r\n\r\n")
        .unwrap();
    assert_eq!(obs.needs_eof_at_headers_complete, Some(false));
}

// -- S5 -----------------------------------------------------------------

#[test]
fn s5_connection_keep_alive_sets_flag_and_should_keep_alive() {
    struct Observer {
        keep_alive_at_headers_complete: Option<bool>,
    }
    impl ParserCallbacks for Observer {
        fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
            self.keep_alive_at_headers_complete = Some(parser.should_keep_alive());
            CB_OK
        }
    }
    let mut parser = Parser::new(Kind::Request);
    let mut obs = Observer {
        keep_alive_at_headers_complete: None,
    };
    parser
        .execute(
            &mut obs,
            b"GET /x HTTP/1.1\r\nConnection: keep-alive\r\n\r\n",
        )
        .unwrap();
    assert_eq!(obs.keep_alive_at_headers_complete, Some(true));
}

// -- S6 -----------------------------------------------------------------

#[test]
fn s6_overflowing_content_length_is_bad_content_length() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    let err = parser
        .execute(
            &mut rec,
            b"GET /x HTTP/1.1\r\nContent-Length: 99999999999999999999\r\n\r\n",
        )
        .unwrap_err();
    assert_eq!(err, pbuf_http::ParserError::BadContentLength);
}

// -- Connection: close (resolved open question) --------------------------

#[test]
fn connection_close_clears_keep_alive_for_http11() {
    struct Observer {
        keep_alive_at_headers_complete: Option<bool>,
    }
    impl ParserCallbacks for Observer {
        fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
            self.keep_alive_at_headers_complete = Some(parser.should_keep_alive());
            CB_OK
        }
    }
    let mut parser = Parser::new(Kind::Request);
    let mut obs = Observer {
        keep_alive_at_headers_complete: None,
    };
    parser
        .execute(&mut obs, b"GET /x HTTP/1.1\r\nConnection: close\r\n\r\n")
        .unwrap();
    assert_eq!(obs.keep_alive_at_headers_complete, Some(false));
}

// -- Property 3: parser chunking invariance -------------------------------

#[test]
fn parser_chunking_invariance_arbitrary_split() {
    let message: &[u8] = b"POST /u HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world";

    let mut whole_parser = Parser::new(Kind::Request);
    let mut whole_rec = Recorder::default();
    whole_parser.execute(&mut whole_rec, message).unwrap();

    for split in 1..message.len() {
        let mut split_parser = Parser::new(Kind::Request);
        let mut split_rec = Recorder::default();
        split_parser
            .execute(&mut split_rec, &message[..split])
            .unwrap();
        split_parser
            .execute(&mut split_rec, &message[split..])
            .unwrap();
        assert_eq!(
            split_rec.events, whole_rec.events,
            "split at byte {} diverged",
            split
        );
    }
}

#[test]
fn parser_chunking_invariance_one_byte_at_a_time() {
    let message: &[u8] =
        b"GET /x HTTP/1.1\r\nHost: example.com\r\nConnection: keep-alive\r\n\r\n";

    let mut whole_parser = Parser::new(Kind::Request);
    let mut whole_rec = Recorder::default();
    whole_parser.execute(&mut whole_rec, message).unwrap();

    let mut byte_parser = Parser::new(Kind::Request);
    let mut byte_rec = Recorder::default();
    for b in message {
        byte_parser.execute(&mut byte_rec, &[*b]).unwrap();
    }
    assert_eq!(byte_rec.events, whole_rec.events);
}

// -- Property 5: case insensitivity ---------------------------------------

#[test]
fn case_insensitivity_of_well_known_header_names() {
    for header in ["Content-Length", "content-length", "CONTENT-LENGTH", "CoNtEnT-LeNgTh"] {
        let request = format!("POST /u HTTP/1.1\r\n{}: 2\r\n\r\nhi", header);
        let mut parser = Parser::new(Kind::Request);
        let mut rec = Recorder::default();
        parser.execute(&mut rec, request.as_bytes()).unwrap();
        assert!(
            rec.events.contains(&Event::Body(b"hi".to_vec())),
            "header spelling {:?} did not take the fast path",
            header
        );
    }
}

#[test]
fn case_insensitivity_of_chunked_transfer_encoding_value() {
    for value in ["chunked", "CHUNKED", "Chunked"] {
        let request = format!(
            "POST /u HTTP/1.1\r\nTransfer-Encoding: {}\r\n\r\n2\r\nhi\r\n0\r\n\r\n",
            value
        );
        let mut parser = Parser::new(Kind::Request);
        let mut rec = Recorder::default();
        parser.execute(&mut rec, request.as_bytes()).unwrap();
        assert!(rec.events.contains(&Event::Body(b"hi".to_vec())));
    }
}

// -- Property 6: reset after message ---------------------------------------

#[test]
fn reset_after_message_clears_fields_but_preserves_app_data_and_kind() {
    let mut parser = Parser::new(Kind::Request);
    let sentinel: i32 = 42;
    parser.set_app_data(&sentinel as *const i32 as *mut std::ffi::c_void);

    let mut rec = Recorder::default();
    parser
        .execute(
            &mut rec,
            b"POST /u HTTP/1.1\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc",
        )
        .unwrap();

    assert_eq!(parser.content_length(), 0);
    assert_eq!(parser.http_major(), 0);
    assert_eq!(parser.http_minor(), 0);
    assert_eq!(parser.status_code(), 0);
    assert_eq!(parser.kind(), Kind::Request);
    assert_eq!(
        parser.app_data(),
        &sentinel as *const i32 as *mut std::ffi::c_void
    );

    // A second message on the same parser starts clean.
    let mut rec2 = Recorder::default();
    parser
        .execute(&mut rec2, b"GET /again HTTP/1.1\r\n\r\n")
        .unwrap();
    assert_eq!(
        rec2.events,
        vec![
            Event::ReqMethod(b"GET".to_vec()),
            Event::ReqPath(b"/again".to_vec()),
            Event::HttpVersion(1, 1),
            Event::HeadersComplete,
            Event::MessageComplete,
        ]
    );
}

// -- Property 7: keep-alive policy ------------------------------------------

#[test]
fn http10_without_keep_alive_header_is_not_kept_alive() {
    struct Observer {
        keep_alive: Option<bool>,
    }
    impl ParserCallbacks for Observer {
        fn on_headers_complete(&mut self, parser: &Parser) -> CallbackResult {
            self.keep_alive = Some(parser.should_keep_alive());
            CB_OK
        }
    }
    let mut parser = Parser::new(Kind::Request);
    let mut obs = Observer { keep_alive: None };
    parser
        .execute(&mut obs, b"GET /x HTTP/1.0\r\n\r\n")
        .unwrap();
    assert_eq!(obs.keep_alive, Some(false));
}

// -- Host abort --------------------------------------------------------------

#[test]
fn callback_abort_surfaces_hosts_own_code_and_resets_parser() {
    struct Aborting;
    impl ParserCallbacks for Aborting {
        fn on_req_method(&mut self, _parser: &Parser, _data: &[u8]) -> CallbackResult {
            7
        }
    }
    let mut parser = Parser::new(Kind::Request);
    let mut cb = Aborting;
    let err = parser.execute(&mut cb, b"GET / HTTP/1.1\r\n\r\n").unwrap_err();
    assert_eq!(err, pbuf_http::ParserError::CallbackAbort(7));
    assert_eq!(err.code(), 7);
}

// -- Scratch buffer overflow ---------------------------------------------

#[test]
fn oversized_header_value_is_pbuffer_overflow_not_truncation() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    let mut request = b"GET /x HTTP/1.1\r\nX-Big: ".to_vec();
    request.extend(std::iter::repeat(b'a').take(90_000));
    request.extend_from_slice(b"\r\n\r\n");

    let err = parser.execute(&mut rec, &request).unwrap_err();
    assert_eq!(err, pbuf_http::ParserError::PbufferOverflow);
}

#[test]
fn bad_method_character_is_rejected() {
    let mut parser = Parser::new(Kind::Request);
    let mut rec = Recorder::default();
    let err = parser.execute(&mut rec, b"G3T / HTTP/1.1\r\n\r\n");
    // digits are not IS_ALPHA, so the method token is rejected as soon as
    // the non-alpha byte is seen.
    assert_eq!(err.unwrap_err(), pbuf_http::ParserError::BadMethod);
}

// -- Malformed-input table, one case per stable error code ------------------

#[rstest]
#[case::bad_path_character(Kind::Request, &b"GET /\x01x HTTP/1.1\r\n\r\n"[..], ParserError::BadPathCharacter)]
#[case::bad_http_version_head(Kind::Request, &b"GET / 1TTP/1.1\r\n\r\n"[..], ParserError::BadHttpVersionHead)]
#[case::bad_header_token(Kind::Request, &b"GET / HTTP/1.1\r\nBa(d: v\r\n\r\n"[..], ParserError::BadHeaderToken)]
#[case::bad_chunk_size(Kind::Request, &b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nZZZ\r\n"[..], ParserError::BadChunkSize)]
#[case::bad_data_after_chunk(Kind::Request, &b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nhiXX"[..], ParserError::BadDataAfterChunk)]
#[case::bad_status_code(Kind::Response, &b"HTTP/1.1 99999999999999999999 Huh\r\n\r\n"[..], ParserError::BadStatusCode)]
fn malformed_input_reports_the_expected_stable_error_code(
    #[case] kind: Kind,
    #[case] input: &[u8],
    #[case] expected: ParserError,
) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut parser = Parser::new(kind);
    let mut rec = Recorder::default();
    let err = parser.execute(&mut rec, input).unwrap_err();
    assert_eq!(err, expected);
}
