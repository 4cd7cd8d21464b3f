#![no_main]

use std::net::{Ipv4Addr, SocketAddr};

use libfuzzer_sys::fuzz_target;
use ringdht_codec::TypeRegistry;
use ringdht_core::InfoHash;
use ringdht_crypto::signing::Ed25519Verifier;
use ringdht_node::{Admission, NodeConfig};

fuzz_target!(|data: &[u8]| {
    let admission = Admission::new(
        TypeRegistry::default(),
        NodeConfig::default(),
        Ed25519Verifier,
    );
    let source = SocketAddr::from((Ipv4Addr::LOCALHOST, 4222));
    let _ = admission.ingest(
        &InfoHash::get(b"fuzz"),
        data,
        &InfoHash::get(b"sender"),
        &source,
    );
});
