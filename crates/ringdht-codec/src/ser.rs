//! Length-prefixed binary primitives shared by every wire record.
//!
//! All integers are big-endian. Variable-length fields carry a `u32` length
//! prefix. Readers never panic: every short read is a [`CodecError`].

use bytes::{Buf, BufMut};

use crate::error::CodecError;

/// Upper bound for any single length-prefixed field, enforced on both
/// encode and decode.
pub const MAX_VALUE_SIZE: usize = 64 * 1024;
/// Size of a blob length prefix.
pub const BLOB_PREFIX_LEN: usize = 4;

/// Payload contract for anything carried on the wire.
pub trait Serializable: Sized {
    /// Appends the canonical encoding to `out`.
    fn pack_into(&self, out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// Reads one record from the front of `buf`, advancing it.
    fn unpack_from(buf: &mut &[u8]) -> Result<Self, CodecError>;

    fn packed(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.pack_into(&mut out)?;
        Ok(out)
    }

    /// Decodes a complete blob, rejecting trailing bytes.
    fn unpack_blob(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut buf = bytes;
        let decoded = Self::unpack_from(&mut buf)?;
        expect_end(&buf)?;
        Ok(decoded)
    }
}

fn ensure(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.remaining() < needed {
        return Err(CodecError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub fn get_u8(buf: &mut &[u8]) -> Result<u8, CodecError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn get_u16(buf: &mut &[u8]) -> Result<u16, CodecError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

pub fn get_u32(buf: &mut &[u8]) -> Result<u32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub fn get_u64(buf: &mut &[u8]) -> Result<u64, CodecError> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

pub fn get_array<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N], CodecError> {
    ensure(buf, N)?;
    let mut out = [0_u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Reads a `u32`-prefixed byte field.
pub fn get_blob(buf: &mut &[u8]) -> Result<Vec<u8>, CodecError> {
    let declared = get_u32(buf)? as usize;
    if declared > MAX_VALUE_SIZE {
        return Err(CodecError::LengthOverflow {
            declared,
            limit: MAX_VALUE_SIZE,
        });
    }
    if declared > buf.remaining() {
        return Err(CodecError::LengthOverflow {
            declared,
            limit: buf.remaining(),
        });
    }
    let mut out = vec![0_u8; declared];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Writes a `u32`-prefixed byte field, refusing anything [`get_blob`] would reject.
pub fn put_blob(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.len() > MAX_VALUE_SIZE {
        return Err(CodecError::FieldTooLarge {
            len: bytes.len(),
            limit: MAX_VALUE_SIZE,
        });
    }
    out.put_u32(bytes.len() as u32);
    out.put_slice(bytes);
    Ok(())
}

/// Fails when any input is left unread.
pub fn expect_end(buf: &[u8]) -> Result<(), CodecError> {
    if buf.has_remaining() {
        return Err(CodecError::TrailingBytes(buf.remaining()));
    }
    Ok(())
}
