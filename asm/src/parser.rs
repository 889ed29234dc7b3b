use arch::Op;
use color_print::cformat;

use crate::{assembler::Assembler, error::Error, imm::Imm};

const COMMENT: char = ';';

// ----------------------------------------------------------------------------
// Statement

/// One source line: an optional label followed by an optional instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stmt {
    pub label: Option<String>,
    pub code: Option<Code>,
}

impl Stmt {
    /// Parses a line, returning the statement and the trailing comment.
    pub fn parse(line: &str) -> Result<(Stmt, Option<String>), Error> {
        let (body, comment) = match line.split_once(COMMENT) {
            Some((body, comment)) => (body, Some(comment.to_string())),
            None => (line, None),
        };

        let mut stmt = Stmt::default();
        let mut rest = body.trim();

        // main:
        if let Some((head, tail)) = rest.split_once(':') {
            let key = head.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(Error::SyntaxError);
            }
            stmt.label = Some(key.to_string());
            rest = tail.trim();
        }

        if !rest.is_empty() {
            stmt.code = Some(Code::parse(rest)?);
        }
        Ok((stmt, comment))
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.code.is_none()
    }

    pub fn apply(&self, asm: &mut Assembler) -> Result<(), Error> {
        if let Some(label) = &self.label {
            asm.label(label)?;
        }
        if let Some(code) = &self.code {
            code.apply(asm)?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Operation

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Op(Op),
    Push(Imm),
    Dup(u8),
    Swap(u8),
    Jump(Option<String>),
    JumpI(Option<String>),
}

impl Code {
    pub fn parse(code: &str) -> Result<Code, Error> {
        match code.split_whitespace().collect::<Vec<_>>().split_first() {
            Some((op, args)) => {
                // arg!(0) -> 0th argument, required
                macro_rules! arg {
                    ($index:expr) => {
                        args.get($index).copied().ok_or(Error::MissingArgument)?
                    };
                }
                // Rejects anything past the `$n`th argument
                macro_rules! arity {
                    ($n:expr) => {
                        if let Some(extra) = args.get($n) {
                            return Err(Error::TooManyArguments(extra.to_string()));
                        }
                    };
                }

                let index = |s: &str| {
                    s.parse::<u8>()
                        .map_err(|_| Error::ParseArgument(s.to_string(), "index".to_string()))
                };

                match op.to_lowercase().as_str() {
                    "push" => {
                        arity!(1);
                        Ok(Code::Push(Imm::parse(arg!(0))?))
                    }
                    "dup" => {
                        arity!(1);
                        Ok(Code::Dup(index(arg!(0))?))
                    }
                    "swap" => {
                        arity!(1);
                        Ok(Code::Swap(index(arg!(0))?))
                    }
                    "jump" => {
                        arity!(1);
                        Ok(Code::Jump(args.first().map(|s| s.to_string())))
                    }
                    "jumpi" => {
                        arity!(1);
                        Ok(Code::JumpI(args.first().map(|s| s.to_string())))
                    }
                    _ => {
                        let op = Op::parse(op).map_err(|_| Error::UnknownOperation(op.to_string()))?;
                        arity!(0);
                        Ok(Code::Op(op))
                    }
                }
            }
            None => Err(Error::SyntaxError),
        }
    }

    pub fn apply(&self, asm: &mut Assembler) -> Result<(), Error> {
        match self {
            Code::Op(op) => asm.op(*op),
            Code::Push(imm) => asm.push(imm.clone())?,
            Code::Dup(n) => asm.dup(*n)?,
            Code::Swap(n) => asm.swap(*n)?,
            Code::Jump(target) => asm.jump(target.as_deref()),
            Code::JumpI(target) => asm.jumpi(target.as_deref()),
        }
        Ok(())
    }

    pub fn cformat(&self) -> String {
        macro_rules! opfmt {
            ($name:expr, $arg:expr) => {
                cformat!("<red>{:<7}</><blue>{}</>", $name, $arg)
            };
        }
        match self {
            Code::Op(op) => opfmt!(op.to_string().to_lowercase(), ""),
            Code::Push(imm) => match imm.encode() {
                Ok(bytes) => opfmt!("push", cformat!("<y>0x{}</>", hex::encode(bytes))),
                Err(_) => opfmt!("push", cformat!("<r,u>??</>")),
            },
            Code::Dup(n) => opfmt!("dup", n),
            Code::Swap(n) => opfmt!("swap", n),
            Code::Jump(target) => opfmt!("jump", target.as_deref().unwrap_or("")),
            Code::JumpI(target) => opfmt!("jumpi", target.as_deref().unwrap_or("")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(src: &str) -> Assembler {
        let mut asm = Assembler::new();
        for line in src.lines() {
            let (stmt, _) = Stmt::parse(line).unwrap();
            stmt.apply(&mut asm).unwrap();
        }
        asm
    }

    #[test]
    fn blank_and_comment_lines() {
        let (stmt, comment) = Stmt::parse("   ; just a note").unwrap();
        assert!(stmt.is_empty());
        assert_eq!(comment.as_deref(), Some(" just a note"));
        assert!(Stmt::parse("").unwrap().0.is_empty());
    }

    #[test]
    fn label_with_trailing_instruction() {
        let (stmt, _) = Stmt::parse("loop: jumpi loop ; spin").unwrap();
        assert_eq!(stmt.label.as_deref(), Some("loop"));
        assert_eq!(stmt.code, Some(Code::JumpI(Some("loop".to_string()))));
    }

    #[test]
    fn operations() {
        assert_eq!(Code::parse("ADD").unwrap(), Code::Op(Op::ADD));
        assert_eq!(Code::parse("sha3").unwrap(), Code::Op(Op::KECCAK256));
        assert_eq!(Code::parse("dup 3").unwrap(), Code::Dup(3));
        assert_eq!(Code::parse("jump").unwrap(), Code::Jump(None));
        assert_eq!(
            Code::parse("push 0x10").unwrap(),
            Code::Push(Imm::parse("0x10").unwrap())
        );
    }

    #[test]
    fn malformed_operations() {
        assert!(matches!(Code::parse("hoge"), Err(Error::UnknownOperation(_))));
        assert!(matches!(Code::parse("push"), Err(Error::MissingArgument)));
        assert!(matches!(Code::parse("add 1"), Err(Error::TooManyArguments(_))));
        assert!(matches!(Code::parse("dup x"), Err(Error::ParseArgument(_, _))));
        assert!(matches!(Code::parse("push zz"), Err(Error::InvalidOperand(_))));
        assert!(matches!(Stmt::parse("two words: add"), Err(Error::SyntaxError)));
    }

    #[test]
    fn text_matches_builder() {
        let text = assemble(
            "start:\n  push 1\n  push 2\n  add\n  dup 0\n  swap 1\n  jumpi start\n  stop\n",
        );

        let mut api = Assembler::new();
        api.label("start").unwrap();
        api.push(1u8).unwrap();
        api.push(2u8).unwrap();
        api.add();
        api.dup(0).unwrap();
        api.swap(1).unwrap();
        api.jumpi(Some("start"));
        api.stop();

        assert_eq!(text.code(), api.code());
    }

    #[test]
    fn countdown_demo() {
        let asm = assemble(include_str!("../../demos/countdown.evm"));
        assert_eq!(asm.labels().get_val("loop"), Some(5));
        assert_eq!(asm.labels().get_val("done"), Some(27));
        assert_eq!(&asm.code()[8..12], &[0x62, 0x00, 0x00, 0x1b]);
        let deploy = asm.finalize().unwrap();
        assert_eq!(deploy.runtime().len(), 37);
        assert_eq!(*deploy.runtime().last().unwrap(), 0xf3);
    }

    #[test]
    fn range_errors_surface_on_apply() {
        let (stmt, _) = Stmt::parse("swap 0").unwrap();
        let mut asm = Assembler::new();
        assert!(matches!(stmt.apply(&mut asm), Err(Error::OutOfRange { .. })));
    }
}
