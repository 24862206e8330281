//! Bit fields within a single register byte.

/// Inclusive bit range `msb..=lsb` of a register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    msb: u8,
    lsb: u8,
}

impl BitField {
    /// Bits `msb` down to `lsb`, inclusive. `None` unless `7 >= msb >= lsb`.
    pub const fn new(msb: u8, lsb: u8) -> Option<Self> {
        if msb > 7 || lsb > msb {
            return None;
        }
        Some(Self { msb, lsb })
    }

    /// A single bit.
    pub const fn bit(index: u8) -> Option<Self> {
        Self::new(index, index)
    }

    pub const fn msb(&self) -> u8 {
        self.msb
    }

    pub const fn lsb(&self) -> u8 {
        self.lsb
    }

    /// Mask of the field, unshifted.
    pub const fn mask(&self) -> u8 {
        (0xffu16 >> (7 - (self.msb - self.lsb)) << self.lsb) as u8
    }

    /// The field's value within `byte`, shifted down to bit 0.
    pub const fn extract(&self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.lsb
    }

    /// `byte` with the field replaced by `value`. Bits of `value` that do not
    /// fit in the field are dropped.
    pub const fn insert(&self, byte: u8, value: u8) -> u8 {
        let mask = self.mask();
        (byte & !mask) | ((value << self.lsb) & mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(7, 0, 0xff)]
    #[test_case(0, 0, 0x01)]
    #[test_case(7, 7, 0x80)]
    #[test_case(5, 3, 0x38)]
    fn mask(msb: u8, lsb: u8, expected: u8) {
        assert_eq!(BitField::new(msb, lsb).unwrap().mask(), expected);
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(BitField::new(8, 0), None);
        assert_eq!(BitField::new(2, 3), None);
        assert_eq!(BitField::bit(8), None);
    }

    #[test]
    fn extract_and_insert() {
        let field = BitField::new(5, 3).unwrap();
        assert_eq!(field.extract(0b1010_1100), 0b101);
        assert_eq!(field.insert(0b1010_1100, 0b010), 0b1001_0100);
        // Overflowing value is truncated to the field width
        assert_eq!(field.insert(0x00, 0xff), 0b0011_1000);
    }

    #[test]
    fn single_bit() {
        let field = BitField::bit(2).unwrap();
        assert_eq!(field.insert(0x00, 1), 0x04);
        assert_eq!(field.insert(0xff, 0), 0xfb);
        assert_eq!(field.extract(0x04), 1);
    }
}
