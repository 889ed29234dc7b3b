pub mod inst;
pub mod op;

pub use inst::Inst;
pub use op::Op;
