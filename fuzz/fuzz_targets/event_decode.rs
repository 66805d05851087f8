//! Fuzz target for event and intent decoding
//!
//! Arbitrary bytes must decode to an error or to a value that survives a
//! second encode/decode unchanged. Decoding never panics.

#![no_main]

use chatsphere_proto::{Frame, decode_event, decode_intent, encode_event, encode_intent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let frame = Frame::new(data.to_vec());

    if let Ok(event) = decode_event(&frame) {
        let again = decode_event(&encode_event(&event)).expect("re-encoded event must decode");
        assert_eq!(again, event);
    }

    if let Ok(intent) = decode_intent(&frame) {
        let again = decode_intent(&encode_intent(&intent)).expect("re-encoded intent must decode");
        assert_eq!(again, intent);
    }
});
