use crate::op::{Op, DUP1, PUSH1, SWAP1};

use color_print::cformat;
use std::fmt;

/// A fully resolved instruction, ready to be laid out as bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Op(Op),
    /// Big-endian immediate of 1..=32 bytes.
    Push(Vec<u8>),
    /// `Dup(n)` encodes as DUP1 + n, n in 0..=15.
    Dup(u8),
    /// `Swap(n)` encodes as SWAP1 + (n - 1), n in 1..=16.
    Swap(u8),
    /// A byte with no opcode, or a push whose immediate runs past the end.
    Invalid(u8),
}

impl Inst {
    pub fn opcode(&self) -> u8 {
        match self {
            Inst::Op(op) => op.byte(),
            Inst::Push(imm) => PUSH1 + (imm.len().max(1) - 1) as u8,
            Inst::Dup(n) => DUP1.wrapping_add(*n),
            Inst::Swap(n) => SWAP1.wrapping_add(n.wrapping_sub(1)),
            Inst::Invalid(byte) => *byte,
        }
    }

    /// Encoded length in bytes.
    pub fn size(&self) -> usize {
        match self {
            Inst::Push(imm) => 1 + imm.len(),
            _ => 1,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        bytes.push(self.opcode());
        if let Inst::Push(imm) = self {
            bytes.extend_from_slice(imm);
        }
        bytes
    }

    /// Linear sweep over `code`, yielding each instruction with its offset.
    pub fn decode(code: &[u8]) -> Vec<(usize, Inst)> {
        let mut insts = vec![];
        let mut pc = 0;
        while pc < code.len() {
            let byte = code[pc];
            let inst = match byte {
                0x60..=0x7f => {
                    let width = (byte - PUSH1) as usize + 1;
                    match code.get(pc + 1..pc + 1 + width) {
                        Some(imm) => Inst::Push(imm.to_vec()),
                        None => Inst::Invalid(byte),
                    }
                }
                0x80..=0x8f => Inst::Dup(byte - DUP1),
                0x90..=0x9f => Inst::Swap(byte - SWAP1 + 1),
                _ => Op::try_from(byte)
                    .map(Inst::Op)
                    .unwrap_or(Inst::Invalid(byte)),
            };
            let size = inst.size();
            insts.push((pc, inst));
            pc += size;
        }
        insts
    }

    /// Value of a push immediate, if it fits in a `usize`.
    pub fn imm_value(&self) -> Option<usize> {
        match self {
            Inst::Push(imm) if imm.len() <= std::mem::size_of::<usize>() => {
                Some(imm.iter().fold(0, |acc, b| acc << 8 | *b as usize))
            }
            _ => None,
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Inst::Op(op) => cformat!("<r>{}</>", op.to_string().to_lowercase()),
            Inst::Push(imm) => cformat!(
                "<r>{:<7}</><y>0x{}</>",
                format!("push{}", imm.len()),
                hexstr(imm)
            ),
            Inst::Dup(n) => cformat!("<r>dup{}</>", *n as u16 + 1),
            Inst::Swap(n) => cformat!("<r>swap{}</>", n),
            Inst::Invalid(byte) => cformat!("<r,s>data</>   <y>0x{:02x}</>", byte),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Op(op) => write!(f, "{op}"),
            Inst::Push(imm) => write!(f, "PUSH{} 0x{}", imm.len(), hexstr(imm)),
            Inst::Dup(n) => write!(f, "DUP{}", *n as u16 + 1),
            Inst::Swap(n) => write!(f, "SWAP{n}"),
            Inst::Invalid(byte) => write!(f, "DATA 0x{byte:02x}"),
        }
    }
}

fn hexstr(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_opcode_tracks_width() {
        assert_eq!(Inst::Push(vec![0x01]).to_bytes(), vec![0x60, 0x01]);
        assert_eq!(
            Inst::Push(vec![0x00, 0x00, 0x05]).to_bytes(),
            vec![0x62, 0x00, 0x00, 0x05]
        );
        assert_eq!(Inst::Push(vec![0xff; 32]).opcode(), 0x7f);
    }

    #[test]
    fn dup_and_swap_windows() {
        assert_eq!(Inst::Dup(0).opcode(), 0x80);
        assert_eq!(Inst::Dup(15).opcode(), 0x8f);
        assert_eq!(Inst::Swap(1).opcode(), 0x90);
        assert_eq!(Inst::Swap(16).opcode(), 0x9f);
    }

    #[test]
    fn decode_sequence() {
        let code = [0x60, 0x01, 0x60, 0x02, 0x01, 0x81, 0x91, 0x00];
        let insts = Inst::decode(&code);
        assert_eq!(
            insts,
            vec![
                (0, Inst::Push(vec![0x01])),
                (2, Inst::Push(vec![0x02])),
                (4, Inst::Op(Op::ADD)),
                (5, Inst::Dup(1)),
                (6, Inst::Swap(2)),
                (7, Inst::Op(Op::STOP)),
            ]
        );
        let bytes: Vec<u8> = insts.iter().flat_map(|(_, i)| i.to_bytes()).collect();
        assert_eq!(bytes, code);
    }

    #[test]
    fn decode_truncated_push_and_unknown_bytes() {
        let insts = Inst::decode(&[0x0c, 0x62, 0x00]);
        assert_eq!(
            insts,
            vec![
                (0, Inst::Invalid(0x0c)),
                (1, Inst::Invalid(0x62)),
                (2, Inst::Op(Op::STOP)),
            ]
        );
    }

    #[test]
    fn imm_value() {
        assert_eq!(Inst::Push(vec![0x01, 0x00]).imm_value(), Some(256));
        assert_eq!(Inst::Op(Op::ADD).imm_value(), None);
        assert_eq!(Inst::Push(vec![0x01; 32]).imm_value(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Inst::Push(vec![0x00, 0x00, 0x05]).to_string(), "PUSH3 0x000005");
        assert_eq!(Inst::Dup(0).to_string(), "DUP1");
        assert_eq!(Inst::Swap(16).to_string(), "SWAP16");
        assert_eq!(Inst::Op(Op::JUMPDEST).to_string(), "JUMPDEST");
    }
}
