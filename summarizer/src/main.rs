use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about = "Markdown report generator for legacysleuth IR")]
struct Args {
    /// Input IR JSON file (default: stdin)
    #[arg(short, long)]
    input: Option<String>,

    /// Output Markdown file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn run(args: Args) -> Result<()> {
    let ir_json = match &args.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            buf
        }
    };

    let md = legacysleuth_summarizer::summarize_ir(&ir_json)?;
    match &args.output {
        Some(path) => fs::write(path, md).with_context(|| format!("failed to write {}", path))?,
        None => print!("{}", md),
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.debug {
        Level::TRACE
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();

    if let Err(e) = run(args) {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }
}
