//! The value envelope stored at a DHT location.
//!
//! A value is either plain, signed, or sealed. Each state carries only the
//! fields that are meaningful for it, so the flag byte is derived from the
//! state instead of being stored next to fields it may contradict.

use std::fmt;

use bytes::BufMut;
use ringdht_core::{InfoHash, PublicKey, HASH_LEN};

use crate::error::CodecError;
use crate::flags::ValueFlags;
use crate::ser::{get_array, get_blob, get_u16, get_u64, get_u8, put_blob, Serializable};
use crate::value_type::{ValueType, ValueTypeId, USER_DATA_ID};

/// Caller-assigned identity distinguishing values at the same key.
pub type ValueId = u64;
/// Unset/invalid value id.
pub const INVALID_ID: ValueId = 0;

/// Metadata shared by plain and signed values.
///
/// Sealed values carry their metadata inside the cypher. After decoding a
/// sealed value from the wire, the envelope is default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub value_type: ValueTypeId,
    /// Replay counter per (owner, key); edits must strictly increase it.
    pub seq: u16,
    pub recipient: Option<InfoHash>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            value_type: USER_DATA_ID,
            seq: 0,
            recipient: None,
        }
    }
}

/// State-specific value body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Unauthenticated plaintext.
    Plain { data: Vec<u8> },
    /// Plaintext with a detached signature over the to-sign view.
    Signed {
        owner: PublicKey,
        data: Vec<u8>,
        signature: Vec<u8>,
    },
    /// Ciphertext of the to-encrypt view.
    Sealed { cypher: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Value {
    pub id: ValueId,
    pub envelope: Envelope,
    pub payload: Payload,
}

impl Default for Value {
    fn default() -> Self {
        Self {
            id: INVALID_ID,
            envelope: Envelope::default(),
            payload: Payload::Plain { data: Vec::new() },
        }
    }
}

impl Value {
    /// Plain value of type `value_type`.
    pub fn new(value_type: ValueTypeId, data: Vec<u8>) -> Self {
        Self {
            id: INVALID_ID,
            envelope: Envelope {
                value_type,
                ..Envelope::default()
            },
            payload: Payload::Plain { data },
        }
    }

    /// Plain generic user data.
    pub fn user_data(data: Vec<u8>) -> Self {
        Self::new(USER_DATA_ID, data)
    }

    /// Plain value carrying a packed typed payload.
    pub fn from_payload<P: Serializable>(
        value_type: &ValueType,
        payload: &P,
        id: ValueId,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(value_type.id(), payload.packed()?).with_id(id))
    }

    pub fn with_id(mut self, id: ValueId) -> Self {
        self.id = id;
        self
    }

    pub fn with_seq(mut self, seq: u16) -> Self {
        self.envelope.seq = seq;
        self
    }

    /// Flag byte implied by the current state.
    pub fn flags(&self) -> ValueFlags {
        match self.payload {
            Payload::Plain { .. } => ValueFlags::new(false, false, self.envelope.recipient.is_some()),
            Payload::Signed { .. } => ValueFlags::new(true, false, self.envelope.recipient.is_some()),
            Payload::Sealed { .. } => ValueFlags::new(true, true, true),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.flags().is_signed()
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags().is_encrypted()
    }

    pub fn value_type(&self) -> ValueTypeId {
        self.envelope.value_type
    }

    pub fn seq(&self) -> u16 {
        self.envelope.seq
    }

    pub fn recipient(&self) -> Option<&InfoHash> {
        self.envelope.recipient.as_ref()
    }

    pub fn owner(&self) -> Option<&PublicKey> {
        match &self.payload {
            Payload::Signed { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// Plaintext, absent once sealed.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Plain { data } | Payload::Signed { data, .. } => Some(data),
            Payload::Sealed { .. } => None,
        }
    }

    pub fn signature(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Signed { signature, .. } => Some(signature),
            _ => None,
        }
    }

    pub fn cypher(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Sealed { cypher } => Some(cypher),
            _ => None,
        }
    }

    /// Addresses the value to `recipient` without touching signed/encrypted state.
    pub fn set_recipient(&mut self, recipient: InfoHash) {
        self.envelope.recipient = Some(recipient);
    }

    /// Seals the value: the body is replaced by `cypher` and the value reads
    /// as signed, encrypted and addressed from here on.
    ///
    /// Callers set the recipient beforehand; it is not checked here.
    pub fn set_cypher(&mut self, cypher: Vec<u8>) {
        self.payload = Payload::Sealed { cypher };
    }

    /// Attaches an owner and signature, keeping the plaintext.
    pub fn into_signed(self, owner: PublicKey, signature: Vec<u8>) -> Result<Self, CodecError> {
        let data = match self.payload {
            Payload::Plain { data } | Payload::Signed { data, .. } => data,
            Payload::Sealed { .. } => {
                return Err(CodecError::InvalidState("sealed value cannot be signed"))
            }
        };
        Ok(Self {
            id: self.id,
            envelope: self.envelope,
            payload: Payload::Signed {
                owner,
                data,
                signature,
            },
        })
    }

    /// Bytes covered by the signature: everything but signature and cypher.
    pub fn to_sign(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        match &self.payload {
            Payload::Plain { data } => self.write_signable(&mut out, None, data)?,
            Payload::Signed { owner, data, .. } => {
                self.write_signable(&mut out, Some(owner), data)?
            }
            Payload::Sealed { .. } => {
                return Err(CodecError::InvalidState("sealed value has no to-sign view"))
            }
        }
        Ok(out)
    }

    /// The to-sign view this value will have once `owner` signs it.
    pub fn to_sign_as(&self, owner: &PublicKey) -> Result<Vec<u8>, CodecError> {
        let data = self
            .data()
            .ok_or(CodecError::InvalidState("sealed value has no to-sign view"))?;
        let mut out = Vec::new();
        self.write_signable(&mut out, Some(owner), data)?;
        Ok(out)
    }

    /// Bytes covered by encryption: the to-sign view followed by the signature.
    ///
    /// Identical to [`Value::pack`] for any value that is not sealed.
    pub fn to_encrypt(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = self.to_sign()?;
        if let Payload::Signed { signature, .. } = &self.payload {
            put_blob(&mut out, signature)?;
        }
        Ok(out)
    }

    fn write_signable(
        &self,
        out: &mut Vec<u8>,
        owner: Option<&PublicKey>,
        data: &[u8],
    ) -> Result<(), CodecError> {
        let flags = ValueFlags::new(owner.is_some(), false, self.envelope.recipient.is_some());
        out.put_u64(self.id);
        out.put_u8(flags.bits());
        put_blob(out, owner.map(|k| &k.0[..]).unwrap_or(&[]))?;
        if let Some(recipient) = &self.envelope.recipient {
            out.put_slice(&recipient.0);
        }
        out.put_u16(self.envelope.value_type);
        out.put_u16(self.envelope.seq);
        put_blob(out, data)
    }

    /// Canonical wire bytes. Fails when a field exceeds [`MAX_VALUE_SIZE`](crate::ser::MAX_VALUE_SIZE).
    pub fn pack(&self) -> Result<Vec<u8>, CodecError> {
        self.packed()
    }

    /// Decodes exactly one value from `bytes`.
    pub fn unpack(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::unpack_blob(bytes)
    }

    /// Decodes one value from the front of `bytes`, returning bytes consumed.
    pub fn unpack_prefix(bytes: &[u8]) -> Result<(Self, usize), CodecError> {
        let mut buf = bytes;
        let value = Self::unpack_from(&mut buf)?;
        Ok((value, bytes.len() - buf.len()))
    }

    /// Decodes the record following an already-read id.
    pub fn unpack_body(id: ValueId, buf: &mut &[u8]) -> Result<Self, CodecError> {
        let raw = get_u8(buf)?;
        let flags = ValueFlags::from_bits(raw).ok_or(CodecError::InvalidFlags(raw))?;

        if flags.is_encrypted() {
            if !(flags.is_signed() && flags.have_recipient()) {
                return Err(CodecError::InvalidFlags(raw));
            }
            let cypher = get_blob(buf)?;
            return Ok(Self {
                id,
                envelope: Envelope::default(),
                payload: Payload::Sealed { cypher },
            });
        }

        let owner_raw = get_blob(buf)?;
        let owner = if flags.is_signed() {
            Some(PublicKey::from_slice(&owner_raw).map_err(|_| {
                CodecError::InvalidValue("signed value owner must be a 32-byte key")
            })?)
        } else if owner_raw.is_empty() {
            None
        } else {
            return Err(CodecError::InvalidValue("unsigned value carries an owner key"));
        };
        let recipient = if flags.have_recipient() {
            Some(InfoHash(get_array::<HASH_LEN>(buf)?))
        } else {
            None
        };
        let value_type = get_u16(buf)?;
        let seq = get_u16(buf)?;
        let data = get_blob(buf)?;

        let payload = match owner {
            Some(owner) => Payload::Signed {
                owner,
                data,
                signature: get_blob(buf)?,
            },
            None => Payload::Plain { data },
        };

        Ok(Self {
            id,
            envelope: Envelope {
                value_type,
                seq,
                recipient,
            },
            payload,
        })
    }

    /// Decodes a back-to-back sequence of packed values.
    pub fn unpack_all(bytes: &[u8]) -> Result<Vec<Self>, CodecError> {
        let mut buf = bytes;
        let mut values = Vec::new();
        while !buf.is_empty() {
            values.push(Self::unpack_from(&mut buf)?);
        }
        Ok(values)
    }
}

impl Serializable for Value {
    fn pack_into(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match &self.payload {
            Payload::Sealed { cypher } => {
                out.put_u64(self.id);
                out.put_u8(self.flags().bits());
                put_blob(out, cypher)
            }
            Payload::Plain { data } => self.write_signable(out, None, data),
            Payload::Signed {
                owner,
                data,
                signature,
            } => {
                self.write_signable(out, Some(owner), data)?;
                put_blob(out, signature)
            }
        }
    }

    fn unpack_from(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let id = get_u64(buf)?;
        Self::unpack_body(id, buf)
    }
}

/// Sealed values compare by cypher only; others by owner, type, data and
/// signature. The id is always compared.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id {
            return false;
        }
        match (&self.payload, &other.payload) {
            (Payload::Sealed { cypher: a }, Payload::Sealed { cypher: b }) => a == b,
            (Payload::Sealed { .. }, _) | (_, Payload::Sealed { .. }) => false,
            _ => {
                self.owner() == other.owner()
                    && self.envelope.value_type == other.envelope.value_type
                    && self.data() == other.data()
                    && self.signature() == other.signature()
            }
        }
    }
}

impl Eq for Value {}

fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value[id:{:016x} flags:{}", self.id, self.flags())?;
        if let Some(cypher) = self.cypher() {
            return write!(f, " cypher:{}B]", cypher.len());
        }
        write!(
            f,
            " type:{} seq:{}",
            self.envelope.value_type, self.envelope.seq
        )?;
        if let Some(owner) = self.owner() {
            write!(f, " owner:{}", short_hex(&owner.0))?;
        }
        if let Some(recipient) = &self.envelope.recipient {
            write!(f, " to:{}", short_hex(&recipient.0))?;
        }
        write!(f, " data:{}B]", self.data().map_or(0, <[u8]>::len))
    }
}
