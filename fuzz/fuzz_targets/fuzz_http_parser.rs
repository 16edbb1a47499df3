#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate pbuf_http;

use pbuf_http::{Kind, NullCallbacks, Parser};

/// Splits the input on the first `\0` byte: everything before becomes the
/// message bytes, the byte right after decides request vs. response (even
/// -> request, odd -> response) so both `execute` paths get exercised.
fuzz_target!(|data: &[u8]| {
    let (body, kind) = match data.iter().position(|b| *b == 0) {
        Some(i) => (&data[..i], data.get(i + 1).copied().unwrap_or(0)),
        None => (data, 0u8),
    };

    let kind = if kind % 2 == 0 {
        Kind::Request
    } else {
        Kind::Response
    };

    let mut parser = Parser::new(kind);
    let mut callbacks = NullCallbacks;
    // Feed it one byte at a time: the most adversarial split, and the one
    // most likely to catch a chunking-invariance regression.
    for b in body {
        if parser.execute(&mut callbacks, &[*b]).is_err() {
            break;
        }
    }
});
