//! 128-bit UUIDs in over-the-air byte order

use core::fmt;

/// A 128-bit UUID stored little-endian, as the BLE stack expects it
///
/// The canonical text form (`8C864B49-9A27-...`) is the byte array read
/// back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uuid128 {
    le_bytes: [u8; 16],
}

/// Rejected UUID text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UuidParseError {
    /// Not 36 characters long
    Length(usize),
    /// Missing hyphen at this position
    Hyphen(usize),
    /// Not a hex digit at this position
    Digit(usize),
}

impl fmt::Display for UuidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(f, "expected 36 characters, got {}", len),
            Self::Hyphen(pos) => write!(f, "expected '-' at position {}", pos),
            Self::Digit(pos) => write!(f, "invalid hex digit at position {}", pos),
        }
    }
}

/// Positions of the hyphens in the canonical form
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Bytes 12 and 13 hold the 16-bit alias of a vendor-specific UUID
const ALIAS_OFFSET: usize = 12;

impl Uuid128 {
    pub const fn from_le_bytes(le_bytes: [u8; 16]) -> Self {
        Self { le_bytes }
    }

    pub const fn from_be_bytes(be_bytes: [u8; 16]) -> Self {
        let mut le_bytes = [0u8; 16];
        let mut i = 0;
        while i < 16 {
            le_bytes[i] = be_bytes[15 - i];
            i += 1;
        }
        Self { le_bytes }
    }

    pub const fn le_bytes(&self) -> [u8; 16] {
        self.le_bytes
    }

    pub fn be_bytes(&self) -> [u8; 16] {
        let mut be = self.le_bytes;
        be.reverse();
        be
    }

    /// Full UUID of a 16-bit alias on this base
    pub const fn with_alias(&self, alias: u16) -> Self {
        let mut le_bytes = self.le_bytes;
        let [lo, hi] = alias.to_le_bytes();
        le_bytes[ALIAS_OFFSET] = lo;
        le_bytes[ALIAS_OFFSET + 1] = hi;
        Self { le_bytes }
    }

    /// The 16-bit alias slot of this UUID
    pub const fn alias(&self) -> u16 {
        u16::from_le_bytes([self.le_bytes[ALIAS_OFFSET], self.le_bytes[ALIAS_OFFSET + 1]])
    }

    /// Parse the canonical hyphenated form (either case)
    pub fn parse(text: &str) -> Result<Self, UuidParseError> {
        let chars = text.as_bytes();
        if chars.len() != 36 {
            return Err(UuidParseError::Length(chars.len()));
        }

        let mut be = [0u8; 16];
        let mut nibble = 0;
        for (pos, &c) in chars.iter().enumerate() {
            if HYPHENS.contains(&pos) {
                if c != b'-' {
                    return Err(UuidParseError::Hyphen(pos));
                }
                continue;
            }
            let value = hex_value(c).ok_or(UuidParseError::Digit(pos))?;
            be[nibble / 2] |= value << if nibble % 2 == 0 { 4 } else { 0 };
            nibble += 1;
        }
        Ok(Self::from_be_bytes(be))
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Uuid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.be_bytes().iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: Uuid128 = Uuid128::from_le_bytes([
        0x8E, 0x74, 0x4C, 0x54, 0x9C, 0xBD, 0x28, 0xA9, 0x2F, 0x47, 0x27, 0x9A, 0x49, 0x4B, 0x86,
        0x8C,
    ]);

    #[test]
    fn test_display_is_reversed_bytes() {
        assert_eq!(
            std::format!("{}", BASE),
            "8C864B49-9A27-472F-A928-BD9C544C748E"
        );
    }

    #[test]
    fn test_alias_replaces_bytes_12_and_13() {
        let service = BASE.with_alias(0x1400);
        assert_eq!(service.le_bytes()[12], 0x00);
        assert_eq!(service.le_bytes()[13], 0x14);
        assert_eq!(service.alias(), 0x1400);
        assert_eq!(
            std::format!("{}", service),
            "8C861400-9A27-472F-A928-BD9C544C748E"
        );
        assert_eq!(BASE.alias(), 0x4B49);
    }

    #[test]
    fn test_parse_accepts_lowercase() {
        assert_eq!(
            Uuid128::parse("8c864b49-9a27-472f-a928-bd9c544c748e"),
            Ok(BASE)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Uuid128::parse("8C864B49"), Err(UuidParseError::Length(8)));
        assert_eq!(
            Uuid128::parse("8C864B49x9A27-472F-A928-BD9C544C748E"),
            Err(UuidParseError::Hyphen(8))
        );
        assert_eq!(
            Uuid128::parse("8C864B49-9A27-472F-A928-BD9C544C748G"),
            Err(UuidParseError::Digit(35))
        );
    }

    proptest! {
        #[test]
        fn prop_text_form_parses_back(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid128::from_le_bytes(bytes);
            let text = std::format!("{}", uuid);
            prop_assert_eq!(Uuid128::parse(&text), Ok(uuid));
        }
    }
}
