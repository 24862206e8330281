//! Register addresses and their on-wire encoding.

use std::fmt;

/// Number of bytes used to address a register on the target device.
///
/// Always chosen by the caller; never inferred from the address value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterWidth {
    /// One address byte.
    Bits8,
    /// Two address bytes, most significant first.
    Bits16,
}

impl RegisterWidth {
    /// Number of address bytes sent on the bus.
    pub const fn byte_count(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
        }
    }
}

/// A register address together with its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterAddress {
    address: u16,
    width: RegisterWidth,
}

impl RegisterAddress {
    /// Create an address with an explicit width.
    ///
    /// With [`RegisterWidth::Bits8`] only the low byte of `address` is kept.
    pub const fn new(address: u16, width: RegisterWidth) -> Self {
        let address = match width {
            RegisterWidth::Bits8 => address & 0x00ff,
            RegisterWidth::Bits16 => address,
        };
        Self { address, width }
    }

    /// An 8-bit register address.
    pub const fn bits8(address: u8) -> Self {
        Self::new(address as u16, RegisterWidth::Bits8)
    }

    /// A 16-bit register address.
    pub const fn bits16(address: u16) -> Self {
        Self::new(address, RegisterWidth::Bits16)
    }

    pub const fn address(&self) -> u16 {
        self.address
    }

    pub const fn width(&self) -> RegisterWidth {
        self.width
    }

    /// Append the address bytes to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self.width {
            RegisterWidth::Bits8 => buf.push(self.address as u8),
            RegisterWidth::Bits16 => buf.extend_from_slice(&self.address.to_be_bytes()),
        }
    }

    /// The address bytes as sent on the bus.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.width.byte_count());
        self.encode_into(&mut buf);
        buf
    }

    /// Reconstruct an address from the leading bytes of `bytes`.
    ///
    /// Returns `None` if there are fewer bytes than `width` requires.
    pub fn decode(bytes: &[u8], width: RegisterWidth) -> Option<Self> {
        match (width, bytes) {
            (RegisterWidth::Bits8, [lo, ..]) => Some(Self::bits8(*lo)),
            (RegisterWidth::Bits16, [hi, lo, ..]) => {
                Some(Self::bits16(u16::from_be_bytes([*hi, *lo])))
            }
            _ => None,
        }
    }
}

impl fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            RegisterWidth::Bits8 => write!(f, "0x{:02x}", self.address),
            RegisterWidth::Bits16 => write!(f, "0x{:04x}", self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RegisterAddress::bits8(0x10), &[0x10]; "8-bit")]
    #[test_case(RegisterAddress::bits8(0xff), &[0xff]; "8-bit max")]
    #[test_case(RegisterAddress::bits16(0x1234), &[0x12, 0x34]; "16-bit big endian")]
    #[test_case(RegisterAddress::bits16(0x00ab), &[0x00, 0xab]; "16-bit small value keeps high byte")]
    fn encode(register: RegisterAddress, expected: &[u8]) {
        assert_eq!(register.to_bytes(), expected);
    }

    #[test]
    fn decode_reverses_encode() {
        for address in 0..=u8::MAX {
            let register = RegisterAddress::bits8(address);
            assert_eq!(
                RegisterAddress::decode(&register.to_bytes(), RegisterWidth::Bits8),
                Some(register)
            );
        }

        for address in (0..=u16::MAX).step_by(251).chain([0xff00, u16::MAX]) {
            let register = RegisterAddress::bits16(address);
            let bytes = register.to_bytes();
            assert_eq!(bytes[0], (address >> 8) as u8);
            assert_eq!(
                RegisterAddress::decode(&bytes, RegisterWidth::Bits16),
                Some(register)
            );
        }
    }

    #[test]
    fn decode_needs_enough_bytes() {
        assert_eq!(RegisterAddress::decode(&[], RegisterWidth::Bits8), None);
        assert_eq!(RegisterAddress::decode(&[0x12], RegisterWidth::Bits16), None);
    }

    #[test]
    fn width_is_never_inferred() {
        // A small value with 16-bit width still takes two bytes
        assert_eq!(RegisterAddress::new(0x05, RegisterWidth::Bits16).to_bytes().len(), 2);
        // A large value with 8-bit width is truncated to its low byte
        assert_eq!(RegisterAddress::new(0x1234, RegisterWidth::Bits8).to_bytes(), [0x34]);
    }

    #[test]
    fn narrow_address_keeps_only_low_byte() {
        let register = RegisterAddress::new(0x1234, RegisterWidth::Bits8);
        assert_eq!(register, RegisterAddress::bits8(0x34));
        assert_eq!(register.address(), 0x34);
        assert_eq!(
            RegisterAddress::decode(&register.to_bytes(), RegisterWidth::Bits8),
            Some(register)
        );
    }

    #[test]
    fn display() {
        assert_eq!(RegisterAddress::bits8(0x0a).to_string(), "0x0a");
        assert_eq!(RegisterAddress::bits16(0x0a).to_string(), "0x000a");
    }
}
