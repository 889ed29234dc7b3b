mod util;

use color_print::cprintln;
use evmasm::{Assembler, Code, Error, Stmt};
use indexmap::IndexMap;
use std::process::ExitCode;

use crate::util::{Line, Symbols};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files
    #[clap(default_value = "main.evm")]
    input: Vec<String>,

    /// Output file
    #[clap(short, long, default_value = "main.evm.hex")]
    output: String,

    /// Write runtime code only, without the deployment loader
    #[clap(short, long)]
    runtime: bool,

    /// Write label offsets as YAML
    #[clap(short, long)]
    symbols: Option<String>,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,
}

fn read_files(paths: &[String]) -> Result<IndexMap<String, Vec<String>>, Error> {
    use std::io::BufRead;

    let mut files = IndexMap::new();
    for path in paths {
        println!("  < {}", path);
        let file = std::fs::File::open(path).map_err(|e| Error::FileOpen(path.clone(), e))?;
        let lines = std::io::BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::FileRead)?;
        files.insert(path.clone(), lines);
    }
    Ok(files)
}

fn write_file(path: &str, contents: &str) -> Result<(), Error> {
    use std::io::Write;

    let mut file = std::fs::File::create(path).map_err(|e| Error::FileCreate(path.to_string(), e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| Error::FileWrite(path.to_string(), e))
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("EVM Assembler");

    println!("1. Read Files and Parse Lines");
    let files = match read_files(&args.input) {
        Ok(files) => files,
        Err(err) => {
            err.print();
            return ExitCode::FAILURE;
        }
    };

    let mut lines = vec![];
    let mut failed = false;
    for (path, raws) in &files {
        for (idx, raw) in raws.iter().enumerate() {
            match Stmt::parse(raw) {
                Ok((stmt, comment)) => lines.push(Line {
                    file: path.clone(),
                    idx,
                    stmt,
                    comment,
                    span: 0..0,
                }),
                Err(err) => {
                    err.print_diag(&files, path, idx);
                    failed = true;
                }
            }
        }
    }
    if failed {
        return ExitCode::FAILURE;
    }

    println!("2. Assemble");
    let mut asm = Assembler::new();
    for line in &mut lines {
        let start = asm.len();
        if let Err(err) = line.stmt.apply(&mut asm) {
            err.print_diag(&files, &line.file, line.idx);
            return ExitCode::FAILURE;
        }
        line.span = start..asm.len();
    }
    println!("  - {} bytes, {} labels", asm.len(), asm.labels().defined().len());

    println!("3. Resolve Labels & Build Loader");
    let deploy = match asm.finalize() {
        Ok(deploy) => deploy,
        Err(err @ Error::UnresolvedLabels(_)) => {
            report_unresolved(&err, &lines, &files);
            return ExitCode::FAILURE;
        }
        Err(err) => {
            err.print();
            return ExitCode::FAILURE;
        }
    };
    println!("  - loader {} bytes", deploy.loader().len());

    println!("4. Output");
    println!("  > {}", &args.output);
    let payload = if args.runtime {
        format!("0x{}", hex::encode(deploy.runtime()))
    } else {
        deploy.to_hex()
    };
    let mut result = write_file(&args.output, &format!("{payload}\n"));

    if let Some(path) = args.symbols.as_deref().filter(|_| result.is_ok()) {
        println!("  > {}", path);
        let symbols = Symbols {
            loader_size: deploy.loader().len(),
            runtime_size: deploy.runtime().len(),
            labels: asm.labels().defined(),
        };
        result = serde_yaml::to_string(&symbols)
            .map_err(Error::Symbols)
            .and_then(|yaml| write_file(path, &yaml));
    }
    if let Err(err) = result {
        err.print();
        return ExitCode::FAILURE;
    }

    if args.dump {
        let loader = (!args.runtime).then(|| deploy.loader());
        util::print_dump(&lines, deploy.runtime(), loader);
    }
    ExitCode::SUCCESS
}

/// Points at every reference to a label that was never placed.
fn report_unresolved(err: &Error, lines: &[Line], files: &IndexMap<String, Vec<String>>) {
    let Error::UnresolvedLabels(names) = err else {
        return;
    };
    cprintln!("<red,bold>error</>: {}", err);
    for line in lines {
        let target = match &line.stmt.code {
            Some(Code::Jump(Some(t)) | Code::JumpI(Some(t))) => t,
            _ => continue,
        };
        if names.contains(target) {
            Error::UnresolvedLabels(vec![target.clone()]).print_diag(files, &line.file, line.idx);
        }
    }
}
