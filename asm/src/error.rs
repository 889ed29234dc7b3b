use color_print::cprintln;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid push operand: `{0}` must encode to 1..=32 bytes")]
    InvalidOperand(String),

    #[error("{op} index {index} out of range {min}..={max}")]
    OutOfRange {
        op: &'static str,
        index: usize,
        min: usize,
        max: usize,
    },

    #[error("Re-defined label: `{0}`")]
    DuplicateLabel(String),

    #[error("Undefined labels: {}", .0.join(", "))]
    UnresolvedLabels(Vec<String>),

    #[error("Label `{0}` at offset 0x{1:X} does not fit in a 3-byte jump target")]
    OffsetOverflow(String, usize),

    #[error("Loader length did not settle after {0} refinements")]
    LoaderDiverged(usize),

    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("More argument required")]
    MissingArgument,

    #[error("Unexpected argument: `{0}`")]
    TooManyArguments(String),

    #[error("Cannot parse `{0}` as {1}")]
    ParseArgument(String, String),

    #[error("Syntax Error: Cannot parse")]
    SyntaxError,

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read line")]
    FileRead(#[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Failed to serialize symbols")]
    Symbols(#[source] serde_yaml::Error),
}

impl Error {
    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, files: &IndexMap<String, Vec<String>>, file: &str, line_idx: usize) {
        cprintln!("<red,bold>error</>: {}", self);

        // line_idx is 0-based, display as 1-based
        let line_num = line_idx + 1;
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, line_num);
        cprintln!("      <blue>|</>");

        let line_content = files
            .get(file)
            .and_then(|lines| lines.get(line_idx))
            .map(|s| s.as_str())
            .unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
        cprintln!("      <blue>|</>");
    }

    /// Print error without source location
    pub fn print(&self) {
        cprintln!("<red,bold>error</>: {}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            cprintln!("  <blue>caused by</>: {}", cause);
            source = std::error::Error::source(cause);
        }
    }
}
