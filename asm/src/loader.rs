//! Deployment loader.
//!
//! The loader is the creation code that copies the runtime out of the payload
//! and returns it:
//!
//! ```text
//! CODESIZE                  size   = whole payload
//! PUSH <loader length>      offset = first runtime byte
//! PUSH 0                    dest   = memory 0
//! CODECOPY
//! PUSH <runtime length>
//! PUSH 0
//! RETURN                    memory[0..runtime length]
//! ```
//!
//! The loader length is pushed with minimal width, so the loader's size depends
//! on itself. [`build`] settles it by re-synthesizing from a trial length until
//! the result measures the same as the trial.

use std::fmt;

use crate::assembler::Assembler;
use crate::error::Error;

/// Upper bound on refinements. Two suffice in practice.
pub const MAX_REFINEMENTS: usize = 8;

/// Loader code that copies `runtime_len` bytes starting at `offset`.
pub fn synthesize(offset: usize, runtime_len: usize) -> Result<Vec<u8>, Error> {
    let mut asm = Assembler::new();
    asm.codesize();
    asm.push(offset)?;
    asm.push(0u8)?;
    asm.codecopy();
    asm.push(runtime_len)?;
    asm.push(0u8)?;
    asm.ret();
    Ok(asm.into_code())
}

/// Smallest loader whose copy offset equals its own length.
pub fn build(runtime_len: usize) -> Result<Vec<u8>, Error> {
    let mut trial = 0;
    for _ in 0..MAX_REFINEMENTS {
        let loader = synthesize(trial, runtime_len)?;
        if loader.len() == trial {
            return Ok(loader);
        }
        trial = loader.len();
    }
    Err(Error::LoaderDiverged(MAX_REFINEMENTS))
}

/// Contract creation payload: loader followed by runtime code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    loader: Vec<u8>,
    runtime: Vec<u8>,
}

impl Deployment {
    pub(crate) fn new(loader: Vec<u8>, runtime: Vec<u8>) -> Self {
        Deployment { loader, runtime }
    }

    pub fn loader(&self) -> &[u8] {
        &self.loader
    }

    pub fn runtime(&self) -> &[u8] {
        &self.runtime
    }

    pub fn len(&self) -> usize {
        self.loader.len() + self.runtime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> Vec<u8> {
        [self.loader.as_slice(), self.runtime.as_slice()].concat()
    }

    /// `0x`-prefixed lowercase hex of [`Deployment::bytes`].
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes()))
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
