//! Symbolic assembler for EVM bytecode.
//!
//! An [`Assembler`] session appends instructions to one byte stream, links
//! labels as they are placed, and finally wraps the stream in a loader that
//! installs it as contract code ([`Deployment`]).
//!
//! ```
//! use evmasm::Assembler;
//!
//! let mut asm = Assembler::new();
//! asm.label("start").unwrap();
//! asm.push(1u8).unwrap();
//! asm.jumpi(Some("start"));
//! asm.stop();
//! let deploy = asm.finalize().unwrap();
//! assert!(deploy.to_hex().starts_with("0x38"));
//! ```

pub mod assembler;
pub mod error;
pub mod imm;
pub mod label;
pub mod loader;
pub mod parser;

pub use assembler::Assembler;
pub use error::Error;
pub use imm::Imm;
pub use loader::Deployment;
pub use parser::{Code, Stmt};
