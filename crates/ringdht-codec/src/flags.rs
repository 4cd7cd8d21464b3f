use std::fmt;

/// Value carries an owner signature.
pub const FLAG_SIGNED: u8 = 0b001;
/// Value body is sealed into a cypher blob.
pub const FLAG_ENCRYPTED: u8 = 0b010;
/// Value names a recipient hash.
pub const FLAG_RECIPIENT: u8 = 0b100;
/// All currently valid flag bits.
pub const FLAG_ALLOWED_MASK: u8 = FLAG_SIGNED | FLAG_ENCRYPTED | FLAG_RECIPIENT;

/// Three-bit descriptor of how a value is signed/encrypted/addressed.
///
/// Pure bit reader: invariants between bits are enforced by [`crate::Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueFlags(u8);

impl ValueFlags {
    pub fn new(signed: bool, encrypted: bool, have_recipient: bool) -> Self {
        let mut bits = 0;
        if signed {
            bits |= FLAG_SIGNED;
        }
        if encrypted {
            bits |= FLAG_ENCRYPTED;
        }
        if have_recipient {
            bits |= FLAG_RECIPIENT;
        }
        Self(bits)
    }

    /// Parses a wire flag byte, rejecting bits outside the known mask.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !FLAG_ALLOWED_MASK != 0 {
            return None;
        }
        Some(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_signed(self) -> bool {
        self.0 & FLAG_SIGNED != 0
    }

    pub fn is_encrypted(self) -> bool {
        self.0 & FLAG_ENCRYPTED != 0
    }

    pub fn have_recipient(self) -> bool {
        self.0 & FLAG_RECIPIENT != 0
    }
}

impl fmt::Display for ValueFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.is_signed() { 'S' } else { '-' };
        let e = if self.is_encrypted() { 'E' } else { '-' };
        let r = if self.have_recipient() { 'R' } else { '-' };
        write!(f, "{s}{e}{r}")
    }
}
