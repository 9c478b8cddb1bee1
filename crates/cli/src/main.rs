//! vjson CLI
//!
//! Command-line front end for parsing, validating, and reformatting JSON
//! documents with the `vjson` crate.

use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "vjson")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse, validate, and reformat JSON documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that input is well-formed JSON, printing nothing on success
    Validate {
        /// Input file (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Accept `//` and `/* */` comments
        #[arg(long)]
        allow_comments: bool,

        /// Accept a trailing comma before a closing `]` or `}`
        #[arg(long)]
        allow_trailing_commas: bool,
    },

    /// Reformat input JSON, either compacted or pretty-printed
    Format {
        /// Input file (reads stdin if omitted)
        input: Option<PathBuf>,

        /// Output file (writes stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print with indentation instead of compacting
        #[arg(short, long)]
        pretty: bool,

        /// Indent width in spaces when pretty-printing
        #[arg(long, default_value_t = 2)]
        indent: usize,

        /// Accept `//` and `/* */` comments on input
        #[arg(long)]
        allow_comments: bool,

        /// Accept a trailing comma before a closing `]` or `}`
        #[arg(long)]
        allow_trailing_commas: bool,
    },
}

fn read_input(path: &Option<PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(p) => fs::read(p),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("vjson=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Validate { input, allow_comments, allow_trailing_commas } => {
            run_validate(input, allow_comments, allow_trailing_commas)
        }
        Commands::Format { input, output, pretty, indent, allow_comments, allow_trailing_commas } => {
            run_format(input, output, pretty, indent, allow_comments, allow_trailing_commas)
        }
    };
    process::exit(exit_code);
}

fn run_validate(input: Option<PathBuf>, allow_comments: bool, allow_trailing_commas: bool) -> i32 {
    let bytes = match read_input(&input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("vjson: failed to read input: {e}");
            return 2;
        }
    };
    let opts = vjson::ParseOptions::new()
        .allow_comments(allow_comments)
        .allow_trailing_commas(allow_trailing_commas);
    match vjson::parse(&bytes, &opts) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("vjson: {e}");
            1
        }
    }
}

fn run_format(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    indent: usize,
    allow_comments: bool,
    allow_trailing_commas: bool,
) -> i32 {
    let bytes = match read_input(&input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("vjson: failed to read input: {e}");
            return 2;
        }
    };
    let parse_opts = vjson::ParseOptions::new()
        .allow_comments(allow_comments)
        .allow_trailing_commas(allow_trailing_commas);
    let doc = match vjson::parse(&bytes, &parse_opts) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("vjson: {e}");
            return 1;
        }
    };
    let stringify_opts = vjson::StringifyOptions::new().pretty(pretty).indent(indent);
    let mut out = vjson::stringify(&doc.root(), &stringify_opts);
    out.push(b'\n');

    let write_result = match output {
        Some(path) => fs::write(path, &out),
        None => io::stdout().write_all(&out),
    };
    if let Err(e) = write_result {
        eprintln!("vjson: failed to write output: {e}");
        return 2;
    }
    0
}
