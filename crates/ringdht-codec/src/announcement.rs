//! Peer announcement payload: a reachable socket address.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::sync::Arc;
use std::time::Duration;

use ringdht_core::InfoHash;

use crate::error::CodecError;
use crate::ser::{get_array, Serializable};
use crate::value::Value;
use crate::value_type::{default_edit_policy, ValueType, ValueTypeId};

/// Type id of service announcements.
pub const ANNOUNCEMENT_TYPE_ID: ValueTypeId = 2;
/// Announcements go stale faster than generic data.
pub const ANNOUNCEMENT_EXPIRATION: Duration = Duration::from_secs(15 * 60);
/// Size of the raw socket-address record.
pub const SOCKADDR_LEN: usize = 28;

pub const AF_UNSPEC: u16 = 0;
pub const AF_INET: u16 = 2;
pub const AF_INET6: u16 = 10;

// family:2 | port:2 | flowinfo:4 | addr:16 | scope_id:4
const FAMILY: std::ops::Range<usize> = 0..2;
const PORT: std::ops::Range<usize> = 2..4;
const FLOWINFO: std::ops::Range<usize> = 4..8;
const ADDR: std::ops::Range<usize> = 8..24;
const SCOPE_ID: std::ops::Range<usize> = 24..28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Unspecified,
    Ipv4,
    Ipv6,
    Other(u16),
}

impl From<u16> for AddressFamily {
    fn from(code: u16) -> Self {
        match code {
            AF_UNSPEC => AddressFamily::Unspecified,
            AF_INET => AddressFamily::Ipv4,
            AF_INET6 => AddressFamily::Ipv6,
            other => AddressFamily::Other(other),
        }
    }
}

/// Raw, family-tagged socket address announced by a peer.
///
/// The port is kept in network byte order inside the record and converted
/// at the accessor boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceAnnouncement {
    raw: [u8; SOCKADDR_LEN],
}

impl Default for ServiceAnnouncement {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ServiceAnnouncement {
    /// Port-only announcement; the receiver fills in the observed address.
    pub fn new(port: u16) -> Self {
        let mut sa = Self {
            raw: [0_u8; SOCKADDR_LEN],
        };
        sa.set_port(port);
        sa
    }

    pub fn from_socket_addr(addr: &SocketAddr) -> Self {
        let mut raw = [0_u8; SOCKADDR_LEN];
        match addr {
            SocketAddr::V4(v4) => {
                raw[FAMILY].copy_from_slice(&AF_INET.to_be_bytes());
                raw[ADDR][..4].copy_from_slice(&v4.ip().octets());
            }
            SocketAddr::V6(v6) => {
                raw[FAMILY].copy_from_slice(&AF_INET6.to_be_bytes());
                raw[FLOWINFO].copy_from_slice(&v6.flowinfo().to_be_bytes());
                raw[ADDR].copy_from_slice(&v6.ip().octets());
                raw[SCOPE_ID].copy_from_slice(&v6.scope_id().to_be_bytes());
            }
        }
        let mut sa = Self { raw };
        sa.set_port(addr.port());
        sa
    }

    /// Copies a raw address record of up to [`SOCKADDR_LEN`] bytes, zero-filling the rest.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() > SOCKADDR_LEN {
            return Err(CodecError::InvalidPayload(
                "raw socket address longer than record",
            ));
        }
        let mut raw = [0_u8; SOCKADDR_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { raw })
    }

    pub fn raw(&self) -> &[u8; SOCKADDR_LEN] {
        &self.raw
    }

    pub fn port(&self) -> u16 {
        u16::from_be_bytes([self.raw[PORT.start], self.raw[PORT.start + 1]])
    }

    pub fn set_port(&mut self, port: u16) {
        self.raw[PORT].copy_from_slice(&port.to_be_bytes());
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::from(u16::from_be_bytes([self.raw[0], self.raw[1]]))
    }

    /// Announced address, when the family is IPv4 or IPv6.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match self.family() {
            AddressFamily::Ipv4 => {
                let mut octets = [0_u8; 4];
                octets.copy_from_slice(&self.raw[ADDR][..4]);
                Some(SocketAddr::V4(SocketAddrV4::new(
                    Ipv4Addr::from(octets),
                    self.port(),
                )))
            }
            AddressFamily::Ipv6 => {
                let mut octets = [0_u8; 16];
                octets.copy_from_slice(&self.raw[ADDR]);
                let mut flow = [0_u8; 4];
                flow.copy_from_slice(&self.raw[FLOWINFO]);
                let mut scope = [0_u8; 4];
                scope.copy_from_slice(&self.raw[SCOPE_ID]);
                Some(SocketAddr::V6(SocketAddrV6::new(
                    Ipv6Addr::from(octets),
                    self.port(),
                    u32::from_be_bytes(flow),
                    u32::from_be_bytes(scope),
                )))
            }
            AddressFamily::Unspecified | AddressFamily::Other(_) => None,
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.peer_addr().map(|a| a.ip())
    }

    /// Announcement value type: 15 minutes, [`Self::store_policy`], no edits.
    pub fn value_type() -> ValueType {
        ValueType::with_policies(
            ANNOUNCEMENT_TYPE_ID,
            "Service Announcement",
            ANNOUNCEMENT_EXPIRATION,
            Arc::new(Self::store_policy),
            Arc::new(default_edit_policy),
        )
    }

    /// Accepts announcements with a non-zero port and rewrites the address
    /// to the one the request was observed from.
    pub fn store_policy(
        _key: &InfoHash,
        value: &mut Value,
        _source_id: &InfoHash,
        source_addr: &SocketAddr,
    ) -> bool {
        let Some(data) = value.data() else {
            return false;
        };
        let Ok(request) = Self::unpack_blob(data) else {
            return false;
        };
        if request.port() == 0 {
            return false;
        }
        let mut observed = Self::from_socket_addr(source_addr);
        observed.set_port(request.port());
        *value = Value::new(ANNOUNCEMENT_TYPE_ID, observed.raw.to_vec()).with_id(value.id);
        true
    }
}

impl Serializable for ServiceAnnouncement {
    fn pack_into(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.extend_from_slice(&self.raw);
        Ok(())
    }

    fn unpack_from(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            raw: get_array::<SOCKADDR_LEN>(buf)?,
        })
    }
}

impl From<SocketAddr> for ServiceAnnouncement {
    fn from(addr: SocketAddr) -> Self {
        Self::from_socket_addr(&addr)
    }
}

impl fmt::Display for ServiceAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.peer_addr(), self.family()) {
            (Some(addr), _) => write!(f, "Peer: {addr}"),
            (None, AddressFamily::Other(code)) => {
                write!(f, "Peer: family {code} port {}", self.port())
            }
            (None, _) => write!(f, "Peer: port {}", self.port()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};

    use ringdht_core::{InfoHash, PublicKey};

    use super::{AddressFamily, ServiceAnnouncement, ANNOUNCEMENT_TYPE_ID, SOCKADDR_LEN};
    use crate::error::CodecError;
    use crate::ser::Serializable;
    use crate::value::Value;

    #[test]
    fn port_is_stored_in_network_order() {
        let sa = ServiceAnnouncement::new(51413);
        assert_eq!(&sa.raw()[2..4], &[0xC8, 0xD5]);
        assert_eq!(sa.port(), 51413);
        assert_eq!(sa.family(), AddressFamily::Unspecified);
        assert!(sa.peer_addr().is_none());
    }

    #[test]
    fn ipv4_address_round_trips() {
        let addr = SocketAddr::from((Ipv4Addr::new(192, 168, 1, 20), 4222));
        let sa = ServiceAnnouncement::from_socket_addr(&addr);
        assert_eq!(sa.family(), AddressFamily::Ipv4);
        assert_eq!(sa.peer_addr(), Some(addr));
        assert_eq!(sa.to_string(), "Peer: 192.168.1.20:4222");
    }

    #[test]
    fn ipv6_address_keeps_flow_and_scope() {
        let addr = SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 7000, 9, 3));
        let sa = ServiceAnnouncement::from(addr);
        assert_eq!(sa.family(), AddressFamily::Ipv6);
        assert_eq!(sa.peer_addr(), Some(addr));
        assert_eq!(sa.ip(), Some(Ipv6Addr::LOCALHOST.into()));
    }

    #[test]
    fn from_raw_zero_fills_and_rejects_oversize() {
        let sa = ServiceAnnouncement::from_raw(&[0x00, 0x02, 0x1F, 0x90]).expect("short raw");
        assert_eq!(sa.family(), AddressFamily::Ipv4);
        assert_eq!(sa.port(), 8080);
        assert!(sa.raw()[4..].iter().all(|b| *b == 0));

        let err = ServiceAnnouncement::from_raw(&[0_u8; SOCKADDR_LEN + 1])
            .expect_err("oversized raw");
        assert!(matches!(err, CodecError::InvalidPayload(_)));
    }

    #[test]
    fn unpack_requires_exact_record_length() {
        let packed = ServiceAnnouncement::new(80).packed().expect("pack");
        assert_eq!(packed.len(), SOCKADDR_LEN);
        assert_eq!(
            ServiceAnnouncement::unpack_blob(&packed).expect("exact length"),
            ServiceAnnouncement::new(80)
        );
        assert!(ServiceAnnouncement::unpack_blob(&packed[..27]).is_err());

        let mut long = packed.clone();
        long.push(0);
        assert_eq!(
            ServiceAnnouncement::unpack_blob(&long).expect_err("trailing byte"),
            CodecError::TrailingBytes(1)
        );
    }

    #[test]
    fn unknown_family_has_no_peer_addr() {
        let sa = ServiceAnnouncement::from_raw(&[0x00, 0x63, 0x00, 0x50]).expect("raw");
        assert_eq!(sa.family(), AddressFamily::Other(99));
        assert!(sa.peer_addr().is_none());
        assert_eq!(sa.to_string(), "Peer: family 99 port 80");
    }

    #[test]
    fn store_policy_rewrites_address_to_observed_source() {
        let ty = ServiceAnnouncement::value_type();
        let mut value = Value::from_payload(&ty, &ServiceAnnouncement::new(51413), 77).expect("payload");
        let source = SocketAddr::from((Ipv4Addr::new(203, 0, 113, 5), 1234));
        let key = InfoHash::get(b"service");

        assert!(ty.accepts_store(&key, &mut value, &InfoHash::get(b"peer"), &source));
        assert_eq!(value.id, 77);
        assert_eq!(value.value_type(), ANNOUNCEMENT_TYPE_ID);

        let stored =
            ServiceAnnouncement::unpack_blob(value.data().expect("plain")).expect("decodes");
        assert_eq!(
            stored.peer_addr(),
            Some(SocketAddr::from((Ipv4Addr::new(203, 0, 113, 5), 51413)))
        );
    }

    #[test]
    fn store_policy_rejects_zero_port_and_garbage() {
        let ty = ServiceAnnouncement::value_type();
        let key = InfoHash::get(b"service");
        let from_id = InfoHash::get(b"peer");
        let source = SocketAddr::from((Ipv4Addr::LOCALHOST, 1));

        let mut zero = Value::from_payload(&ty, &ServiceAnnouncement::new(0), 1).expect("payload");
        assert!(!ty.accepts_store(&key, &mut zero, &from_id, &source));

        let mut garbage = Value::new(ANNOUNCEMENT_TYPE_ID, vec![1, 2, 3]).with_id(2);
        assert!(!ty.accepts_store(&key, &mut garbage, &from_id, &source));

        let mut sealed = Value::new(ANNOUNCEMENT_TYPE_ID, vec![]).with_id(3);
        sealed.set_cypher(vec![9; 8]);
        assert!(!ty.accepts_store(&key, &mut sealed, &from_id, &source));
    }

    #[test]
    fn announcement_type_rejects_edits() {
        let ty = ServiceAnnouncement::value_type();
        let key = InfoHash::get(b"service");
        let old = Value::from_payload(&ty, &ServiceAnnouncement::new(1), 1).expect("payload");
        let mut new = Value::from_payload(&ty, &ServiceAnnouncement::new(2), 1).expect("payload")
            .into_signed(PublicKey([1; 32]), vec![])
            .expect("sign");
        assert!(!ty.accepts_edit(
            &key,
            &old,
            &mut new,
            &InfoHash::default(),
            &SocketAddr::from((Ipv4Addr::LOCALHOST, 1))
        ));
    }
}
