use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use legacysleuth::explain::Explainer;
use legacysleuth::parser::{Ir, Language};
use legacysleuth::{analyze, detect_language, summarizer, PromptExplainer};
use std::fs;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(author, version, about = "legacysleuth: COBOL and JCL parser, summarizer and analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a COBOL or JCL file and output IR JSON
    Parse {
        /// Input source file
        input: String,
        /// Source language (detected from the content when omitted)
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Summarize IR JSON and output Markdown
    Summarize {
        /// Input IR JSON file (default: stdin)
        #[arg(short, long)]
        input: Option<String>,
        /// Output Markdown file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Analyze a source file (detect + parse + summarize in-process)
    Analyze {
        /// Input source file
        input: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        /// Attach the explanation prompt built from the IR
        #[arg(long)]
        explain: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_input(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

fn write_output(output: Option<&str>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write {}", path)),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Parse { input, language } => {
            let source = read_input(&input)?;
            let language = match language {
                Some(language) => language,
                None => detect_language(&source).ok_or_else(|| anyhow!("could not detect language of {}", input))?,
            };
            debug!(%language, %input, "parsing");
            let ir = language.parse_source(&source)?;
            println!("{}", serde_json::to_string_pretty(&ir)?);
        }
        Commands::Summarize { input, output } => {
            let ir_json = match input {
                Some(path) => read_input(&path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
                    buf
                }
            };
            let md = summarizer::summarize_ir(&ir_json)?;
            write_output(output.as_deref(), &md)?;
        }
        Commands::Analyze { input, output, format, explain } => {
            let source = read_input(&input)?;
            let explainer: Option<&dyn Explainer> = if explain { Some(&PromptExplainer) } else { None };
            let analysis = analyze(&source, explainer)?;
            let text = match format {
                Format::Json => serde_json::to_string_pretty(&analysis)? + "\n",
                Format::Markdown => {
                    let mut md = summarizer::render(&analysis.intermediate_representation)?;
                    if let Some(explanation) = &analysis.explanation {
                        md.push_str("\n## Explanation\n\n");
                        md.push_str(explanation);
                        md.push('\n');
                    }
                    md
                }
            };
            if let Ir::Cobol(ir) = &analysis.intermediate_representation {
                debug!(program_id = ir.program_id().unwrap_or("UNKNOWN"), "analyzed");
            }
            write_output(output.as_deref(), &text)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);
    run(cli.command).unwrap_or_else(|e| {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    });
}
