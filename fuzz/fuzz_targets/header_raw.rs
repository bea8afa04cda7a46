#![no_main]

use libfuzzer_sys::fuzz_target;

use mqtt_frame::{decode_var_int, encode_var_int, packet::Header};

fuzz_target!(|data: &[u8]| {
    let _ = Header::decode(data);

    let mut offset = 0;
    if let Ok((value, size)) = decode_var_int(data, &mut offset) {
        // a non-minimal encoding decodes too, so only the value round trips
        let encoded = encode_var_int(value as usize).unwrap();
        assert!(encoded.len() <= size);
        let mut offset = 0;
        assert_eq!(decode_var_int(&encoded, &mut offset).unwrap().0, value);
    }
});
