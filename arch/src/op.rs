use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// First opcode of the PUSH1..PUSH32 family.
pub const PUSH1: u8 = 0x60;
/// First opcode of the DUP1..DUP16 family.
pub const DUP1: u8 = 0x80;
/// First opcode of the SWAP1..SWAP16 family.
pub const SWAP1: u8 = 0x90;

/// Widest immediate a single push can carry.
pub const MAX_PUSH: usize = 32;
/// Number of stack slots reachable by DUP and SWAP.
pub const STACK_WINDOW: u8 = 16;

/// Fixed-arity opcodes. Each one encodes as exactly one byte.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Op {
    // 0x00: arithmetic
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0a,
    SIGNEXTEND = 0x0b,

    // 0x10: comparison & bitwise
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1a,
    SHL = 0x1b,
    SHR = 0x1c,
    SAR = 0x1d,

    #[strum(to_string = "KECCAK256", serialize = "SHA3", serialize = "KECCAK")]
    KECCAK256 = 0x20,

    // 0x30: environment
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3a,
    EXTCODESIZE = 0x3b,
    EXTCODECOPY = 0x3c,
    RETURNDATASIZE = 0x3d,
    RETURNDATACOPY = 0x3e,
    EXTCODEHASH = 0x3f,

    // 0x40: block
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    DIFFICULTY = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,

    // 0x50: stack, memory, storage, flow
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5a,
    JUMPDEST = 0x5b,

    // 0xa0: logging
    LOG0 = 0xa0,
    LOG1 = 0xa1,
    LOG2 = 0xa2,
    LOG3 = 0xa3,
    LOG4 = 0xa4,

    // 0xf0: system
    CREATE = 0xf0,
    CALL = 0xf1,
    CALLCODE = 0xf2,
    RETURN = 0xf3,
    DELEGATECALL = 0xf4,
    CREATE2 = 0xf5,
    STATICCALL = 0xfa,
    REVERT = 0xfd,
    INVALID = 0xfe,
    SELFDESTRUCT = 0xff,
}

impl Op {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn byte(self) -> u8 {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Op::parse("add"), Ok(Op::ADD));
        assert_eq!(Op::parse("CodeCopy"), Ok(Op::CODECOPY));
        assert!(Op::parse("hoge").is_err());
    }

    #[test]
    fn keccak_aliases() {
        assert_eq!(Op::parse("sha3"), Ok(Op::KECCAK256));
        assert_eq!(Op::parse("keccak"), Ok(Op::KECCAK256));
        assert_eq!(Op::KECCAK256.to_string(), "KECCAK256");
    }

    #[test]
    fn every_op_round_trips_through_its_byte() {
        for op in Op::iter() {
            assert_eq!(Op::try_from(op.byte()).ok(), Some(op));
            assert_eq!(Op::parse(&op.to_string()), Ok(op));
        }
    }

    #[test]
    fn families_are_not_fixed_ops() {
        for byte in PUSH1..=0x9f {
            assert!(Op::try_from(byte).is_err(), "0x{byte:02x}");
        }
    }

    #[test]
    fn well_known_bytes() {
        assert_eq!(Op::STOP.byte(), 0x00);
        assert_eq!(Op::JUMPDEST.byte(), 0x5b);
        assert_eq!(Op::RETURN.byte(), 0xf3);
        assert_eq!(Op::SELFDESTRUCT.byte(), 0xff);
    }
}
