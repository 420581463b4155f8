use anyhow::{Context, Result};
use clap::Parser;
use legacysleuth_parser::Language;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(author, version, about = "Extract IR JSON from a COBOL program or JCL deck")]
struct Args {
    /// Input source file
    input: PathBuf,
    /// Source language (cobol or jcl)
    #[arg(short, long, default_value = "cobol")]
    language: Language,
    /// Enable verbose output
    #[arg(long)]
    verbose: bool,
}

fn run(args: Args) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let ir = args.language.parse_source(&source)?;
    debug!(language = %args.language, warnings = ir.warnings().len(), "parsed");
    println!("{}", serde_json::to_string_pretty(&ir)?);
    Ok(())
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}
