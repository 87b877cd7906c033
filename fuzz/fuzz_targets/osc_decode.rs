#![no_main]

use libfuzzer_sys::fuzz_target;
use tuio_osc::OscPacket;

fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = OscPacket::decode(data) {
        // Anything we accept must survive a re-encode
        let bytes = packet.encode();
        assert!(OscPacket::decode(&bytes).is_ok());
        let _ = packet.into_messages();
    }
});
