use arch::op::MAX_PUSH;
use std::str::FromStr;

use crate::error::Error;

/// Push operand before encoding, held as big-endian bytes.
///
/// Leading zeros are kept until [`Imm::encode`] trims them, so an empty
/// hex literal (`0x`) survives parsing and is rejected at push time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imm(Vec<u8>);

impl Imm {
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Imm(bytes.to_vec())
    }

    /// Decimal digits or `0x`-prefixed hex of any length.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidOperand(s.to_string());
        if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let padded = if digits.len() % 2 == 1 {
                format!("0{digits}")
            } else {
                digits.to_string()
            };
            hex::decode(padded).map(Imm).map_err(|_| invalid())
        } else {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let mut be = vec![0u8];
            for digit in s.bytes().map(|b| b - b'0') {
                let mut carry = digit as u16;
                for byte in be.iter_mut().rev() {
                    let acc = *byte as u16 * 10 + carry;
                    *byte = acc as u8;
                    carry = acc >> 8;
                }
                if carry > 0 {
                    be.insert(0, carry as u8);
                }
            }
            Ok(Imm(be))
        }
    }

    /// Minimal big-endian encoding: no leading zero byte, zero is one byte.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        if self.0.is_empty() {
            return Err(Error::InvalidOperand("0x".to_string()));
        }
        let first = self.0.iter().position(|b| *b != 0);
        let minimal = match first {
            Some(idx) => self.0[idx..].to_vec(),
            None => vec![0],
        };
        if minimal.len() > MAX_PUSH {
            return Err(Error::InvalidOperand(format!("0x{}", hex::encode(&minimal))));
        }
        Ok(minimal)
    }
}

impl FromStr for Imm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Imm::parse(s)
    }
}

macro_rules! imm_from_uint {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Imm {
                fn from(v: $t) -> Self {
                    Imm(v.to_be_bytes().to_vec())
                }
            }
        )*
    };
}

imm_from_uint!(u8, u16, u32, u64, u128, usize);

impl From<&[u8]> for Imm {
    fn from(bytes: &[u8]) -> Self {
        Imm::from_be_bytes(bytes)
    }
}

impl From<Vec<u8>> for Imm {
    fn from(bytes: Vec<u8>) -> Self {
        Imm(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_one_byte() {
        assert_eq!(Imm::from(0u64).encode().unwrap(), vec![0x00]);
        assert_eq!(Imm::parse("0").unwrap().encode().unwrap(), vec![0x00]);
        assert_eq!(Imm::parse("0x0000").unwrap().encode().unwrap(), vec![0x00]);
    }

    #[test]
    fn leading_zeros_are_trimmed() {
        assert_eq!(Imm::from(0x0100u32).encode().unwrap(), vec![0x01, 0x00]);
        assert_eq!(Imm::parse("0x000001").unwrap().encode().unwrap(), vec![0x01]);
    }

    #[test]
    fn odd_hex_digits() {
        assert_eq!(Imm::parse("0xabc").unwrap().encode().unwrap(), vec![0x0a, 0xbc]);
    }

    #[test]
    fn decimal_beyond_u128() {
        // 2^128
        let imm = Imm::parse("340282366920938463463374607431768211456").unwrap();
        let mut expected = vec![0x01];
        expected.extend([0u8; 16]);
        assert_eq!(imm.encode().unwrap(), expected);
    }

    #[test]
    fn empty_hex_is_invalid() {
        let imm = Imm::parse("0x").unwrap();
        assert!(matches!(imm.encode(), Err(Error::InvalidOperand(_))));
    }

    #[test]
    fn wider_than_32_bytes_is_invalid() {
        let imm = Imm::parse(&format!("0x01{}", "00".repeat(32))).unwrap();
        assert!(matches!(imm.encode(), Err(Error::InvalidOperand(_))));
        let imm = Imm::parse(&format!("0x{}", "ff".repeat(32))).unwrap();
        assert_eq!(imm.encode().unwrap().len(), 32);
    }

    #[test]
    fn malformed_text() {
        for s in ["", "12a", "-1", "0xzz", "label"] {
            assert!(matches!(Imm::parse(s), Err(Error::InvalidOperand(_))), "{s}");
        }
    }

    proptest! {
        #[test]
        fn decimal_and_integer_agree(v in any::<u128>()) {
            let text = Imm::parse(&v.to_string()).unwrap().encode().unwrap();
            let int = Imm::from(v).encode().unwrap();
            prop_assert_eq!(text, int);
        }

        #[test]
        fn minimal_encoding_has_no_leading_zero(v in 1u64..) {
            let bytes = Imm::from(v).encode().unwrap();
            prop_assert_ne!(bytes[0], 0);
            let back = bytes.iter().fold(0u64, |acc, b| acc << 8 | *b as u64);
            prop_assert_eq!(back, v);
        }
    }
}
