//! Assembly session: emits instructions into one byte stream and links labels.
//!
//! Jump targets are always pushed as a 3-byte immediate. A target that is not
//! yet defined is written as `PUSH3 00 00 00` and its operand position is kept
//! until the label shows up, at which point every waiting site is rewritten.
//! Nothing is linked lazily at finalize; finalize only checks that no site is
//! still waiting.

use arch::op::{Op, STACK_WINDOW};
use arch::Inst;

use crate::error::Error;
use crate::imm::Imm;
use crate::label::{self, Labels, LABEL_WIDTH};
use crate::loader::{self, Deployment};

#[derive(Debug, Default, Clone)]
pub struct Assembler {
    code: Vec<u8>,
    labels: Labels,
}

macro_rules! fixed_ops {
    ($($name:ident => $op:ident),* $(,)?) => {
        impl Assembler {
            $(
                #[doc = concat!("Emits `", stringify!($op), "`.")]
                pub fn $name(&mut self) {
                    self.op(Op::$op);
                }
            )*
        }
    };
}

fixed_ops! {
    stop => STOP, add => ADD, mul => MUL, sub => SUB, div => DIV, sdiv => SDIV,
    modulo => MOD, smod => SMOD, addmod => ADDMOD, mulmod => MULMOD, exp => EXP,
    signextend => SIGNEXTEND,

    lt => LT, gt => GT, slt => SLT, sgt => SGT, eq => EQ, iszero => ISZERO,
    and => AND, or => OR, xor => XOR, not => NOT, byte => BYTE,
    shl => SHL, shr => SHR, sar => SAR,

    keccak256 => KECCAK256,

    address => ADDRESS, balance => BALANCE, origin => ORIGIN, caller => CALLER,
    callvalue => CALLVALUE, calldataload => CALLDATALOAD, calldatasize => CALLDATASIZE,
    calldatacopy => CALLDATACOPY, codesize => CODESIZE, codecopy => CODECOPY,
    gasprice => GASPRICE, extcodesize => EXTCODESIZE, extcodecopy => EXTCODECOPY,
    returndatasize => RETURNDATASIZE, returndatacopy => RETURNDATACOPY,
    extcodehash => EXTCODEHASH,

    blockhash => BLOCKHASH, coinbase => COINBASE, timestamp => TIMESTAMP,
    number => NUMBER, difficulty => DIFFICULTY, gaslimit => GASLIMIT,
    chainid => CHAINID, selfbalance => SELFBALANCE, basefee => BASEFEE,

    pop => POP, mload => MLOAD, mstore => MSTORE, mstore8 => MSTORE8,
    sload => SLOAD, sstore => SSTORE, pc => PC, msize => MSIZE, gas => GAS,

    log0 => LOG0, log1 => LOG1, log2 => LOG2, log3 => LOG3, log4 => LOG4,

    create => CREATE, call => CALL, callcode => CALLCODE, ret => RETURN,
    delegatecall => DELEGATECALL, create2 => CREATE2, staticcall => STATICCALL,
    revert => REVERT, invalid => INVALID, selfdestruct => SELFDESTRUCT,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler::default()
    }

    /// Current stream length, which is also the offset of the next byte.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The stream as assembled so far. Forward references still read as zero.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn into_code(self) -> Vec<u8> {
        self.code
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn op(&mut self, op: Op) {
        self.code.push(op.byte());
    }

    fn emit(&mut self, inst: Inst) {
        self.code.extend(inst.to_bytes());
    }

    pub fn push(&mut self, value: impl Into<Imm>) -> Result<(), Error> {
        let bytes = value.into().encode()?;
        self.emit(Inst::Push(bytes));
        Ok(())
    }

    /// `dup(n)` copies the item `n` slots below the top, n in 0..=15.
    pub fn dup(&mut self, n: u8) -> Result<(), Error> {
        if n >= STACK_WINDOW {
            return Err(Error::OutOfRange {
                op: "dup",
                index: n as usize,
                min: 0,
                max: STACK_WINDOW as usize - 1,
            });
        }
        self.emit(Inst::Dup(n));
        Ok(())
    }

    /// `swap(n)` exchanges the top with the item `n` slots below, n in 1..=16.
    pub fn swap(&mut self, n: u8) -> Result<(), Error> {
        if n < 1 || n > STACK_WINDOW {
            return Err(Error::OutOfRange {
                op: "swap",
                index: n as usize,
                min: 1,
                max: STACK_WINDOW as usize,
            });
        }
        self.emit(Inst::Swap(n));
        Ok(())
    }

    /// Places a `JUMPDEST` named `name` and patches every reference waiting on it.
    pub fn label(&mut self, name: &str) -> Result<(), Error> {
        let offset = self.code.len();
        let sites = self.labels.define(name, offset)?;
        self.op(Op::JUMPDEST);
        let target = label::encode_offset(offset);
        for site in sites {
            self.code[site..site + LABEL_WIDTH].copy_from_slice(&target);
        }
        Ok(())
    }

    fn push_label(&mut self, name: &str) {
        let target = match self.labels.get_val(name) {
            Some(offset) => label::encode_offset(offset),
            None => {
                // operand starts right after the PUSH3 opcode
                self.labels.defer(name, self.code.len() + 1);
                [0; LABEL_WIDTH]
            }
        };
        self.emit(Inst::Push(target.to_vec()));
    }

    /// Emits `JUMP`, first pushing `target` if one is named.
    pub fn jump(&mut self, target: Option<&str>) {
        if let Some(name) = target {
            self.push_label(name);
        }
        self.op(Op::JUMP);
    }

    /// Emits `JUMPI`, first pushing `target` if one is named.
    pub fn jumpi(&mut self, target: Option<&str>) {
        if let Some(name) = target {
            self.push_label(name);
        }
        self.op(Op::JUMPI);
    }

    /// Fails with the names of every label that is referenced but never placed.
    pub fn check_resolved(&self) -> Result<(), Error> {
        self.labels.check_resolved()
    }

    /// The linked runtime code.
    pub fn runtime(&self) -> Result<&[u8], Error> {
        self.check_resolved()?;
        Ok(&self.code)
    }

    /// Wraps the linked runtime code in a loader that installs it.
    pub fn finalize(&self) -> Result<Deployment, Error> {
        let runtime = self.runtime()?;
        let loader = loader::build(runtime.len())?;
        Ok(Deployment::new(loader, runtime.to_vec()))
    }
}
