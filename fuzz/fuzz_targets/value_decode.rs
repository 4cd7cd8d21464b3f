#![no_main]

use libfuzzer_sys::fuzz_target;
use ringdht_codec::{Serializable, ServiceAnnouncement, Value};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = Value::unpack(data) {
        // a decoded value must re-encode to the bytes it came from
        assert_eq!(value.pack().ok().as_deref(), Some(data));
        let _ = value.to_sign();
        let _ = value.to_encrypt();
    }
    let _ = Value::unpack_prefix(data);
    let _ = Value::unpack_all(data);
    let _ = ServiceAnnouncement::unpack_blob(data);
});
