use std::net::{Ipv4Addr, SocketAddr};

use ringdht_codec::TypeRegistry;
use ringdht_core::InfoHash;
use ringdht_crypto::signing::Ed25519Verifier;
use ringdht_node::{Admission, AdmissionDecision, NodeConfig, RejectReason};

fn xorshift64(state: &mut u64) -> u64 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    *state
}

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut s = seed.max(1);
    let mut out = vec![0_u8; len];
    for b in &mut out {
        *b = (xorshift64(&mut s) & 0xFF) as u8;
    }
    out
}

#[test]
fn fuzz_like_admission_ingest_does_not_panic() {
    let admission = Admission::new(
        TypeRegistry::default(),
        NodeConfig::default(),
        Ed25519Verifier,
    );
    let key = InfoHash::get(b"fuzz-key");
    let source_id = InfoHash::get(b"sender");
    let source = SocketAddr::from((Ipv4Addr::LOCALHOST, 4222));

    for i in 0..1500_u64 {
        let len = ((i as usize) * 37) % 4096;
        let mut bytes = random_bytes(0xC0DEC0DE ^ i, len);
        // keep the flags byte plausible so decoding gets past the header
        if bytes.len() > 8 {
            bytes[8] &= 0b111;
        }
        let decision = admission.ingest(&key, &bytes, &source_id, &source);
        if let AdmissionDecision::Rejected(reason) = decision {
            assert!(
                matches!(
                    reason,
                    RejectReason::Malformed
                        | RejectReason::BadSignature
                        | RejectReason::StorePolicy
                        | RejectReason::TooLarge { .. }
                ),
                "unexpected rejection {reason:?}"
            );
        }
    }
}
