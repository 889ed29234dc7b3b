use arch::Inst;
use color_print::{cformat, cprintln};
use evmasm::Stmt;
use indexmap::IndexMap;
use serde::Serialize;
use std::ops::Range;

/// A parsed source line and the bytes it produced.
#[derive(Debug)]
pub struct Line {
    pub file: String,
    pub idx: usize,
    pub stmt: Stmt,
    pub comment: Option<String>,
    pub span: Range<usize>,
}

/// Layout summary written by `--symbols`.
#[derive(Debug, Serialize)]
pub struct Symbols<'a> {
    pub loader_size: usize,
    pub runtime_size: usize,
    pub labels: &'a IndexMap<String, usize>,
}

const SHOWN_BYTES: usize = 5;

fn bytes_column(code: &[u8], span: &Range<usize>) -> String {
    let bytes = &code[span.clone()];
    let mut col = bytes
        .iter()
        .take(SHOWN_BYTES)
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > SHOWN_BYTES {
        col.push_str("..");
    }
    col
}

pub fn print_dump(lines: &[Line], code: &[u8], loader: Option<&[u8]>) {
    if let Some(loader) = loader {
        println!("{}+------[loader]{}", "-".repeat(23), "-".repeat(41));
        for (pc, inst) in Inst::decode(loader) {
            cprintln!(
                "[{:04X}] {:<16} |         {}",
                pc,
                bytes_column(loader, &(pc..pc + inst.size())),
                inst.cformat()
            );
        }
    }

    let mut current = "";
    for line in lines {
        // Print file header for first line
        if line.file != current {
            current = &line.file;
            println!(
                "{}+------[{}]{}",
                "-".repeat(23),
                current,
                "-".repeat(45usize.saturating_sub(current.len()))
            );
        }

        let comment_str = line
            .comment
            .as_ref()
            .map(|s| format!(";{}", s))
            .unwrap_or_default();
        let label_str = line
            .stmt
            .label
            .as_ref()
            .map(|key| cformat!("<g>{}:</> ", key))
            .unwrap_or_default();
        let code_str = line
            .stmt
            .code
            .as_ref()
            .map(|c| c.cformat())
            .unwrap_or_default();

        let line_num = line.idx + 1;
        if line.span.is_empty() {
            println!(
                "{:23}| {:>4}: {}{} {}",
                "", line_num, label_str, code_str, comment_str
            );
        } else {
            println!(
                "[{:04X}] {:<16} | {:>4}: {}{} {}",
                line.span.start,
                bytes_column(code, &line.span),
                line_num,
                label_str,
                code_str,
                comment_str
            );
        }
    }
    println!("-----------------------+-----------------------------------------------------");
}
