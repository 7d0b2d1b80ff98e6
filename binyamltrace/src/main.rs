//! Command-line tool that prints the event trace of a YAML document.
//!
//! Usage: yamltrace [OPTIONS] [FILE]
//!
//! Options:
//!       --indent <N>                Spaces per nesting level [default: 3]
//!       --deny-composite-anchors    Fail on anchors attached to sequences or maps
//!       --no-reload                 Skip loading and re-printing the whole document
//!   -v, --verbose...                More log output (-v, -vv, -vvv)
//!   -h, --help                      Print help
//!   -V, --version                   Print version

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use libyamltrace::{trace_with_filename, CompositeAnchors, TraceOptions, DEFAULT_INDENT_WIDTH};
use log::{debug, info};

mod reload;

#[derive(Parser, Debug)]
#[command(name = "yamltrace", version, about = "Print the event trace of a YAML document")]
struct Cli {
    /// YAML file to trace; stdin when omitted or `-`
    file: Option<PathBuf>,

    /// Spaces per nesting level
    #[arg(long, default_value_t = DEFAULT_INDENT_WIDTH)]
    indent: usize,

    /// Fail on anchors attached to sequences or maps instead of warning
    #[arg(long)]
    deny_composite_anchors: bool,

    /// Skip loading and re-printing the whole document after the trace
    #[arg(long)]
    no_reload: bool,

    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn input_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|p| p.as_path() != Path::new("-"))
    }

    fn trace_options(&self) -> TraceOptions {
        let policy = if self.deny_composite_anchors {
            CompositeAnchors::Deny
        } else {
            CompositeAnchors::Warn
        };
        TraceOptions::new()
            .with_indent_width(self.indent)
            .with_composite_anchors(policy)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {}", path.display(), e)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("reading stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let path = cli.input_path();
    let input = read_input(path)?;
    let filename = path.map(|p| p.display().to_string());
    debug!("read {} bytes", input.len());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let traced = trace_with_filename(&input, filename.as_deref(), &cli.trace_options(), &mut out);
    // whatever was traced before a failure still goes out
    out.flush().map_err(|e| format!("writing stdout: {}", e))?;
    let report = traced.map_err(|e| e.to_string())?;
    info!(
        "traced {} document(s), {} warning(s)",
        report.documents,
        report.warnings.len()
    );

    if cli.no_reload {
        return Ok(());
    }
    let reloaded = reload::render(&input).map_err(|e| format!("reload failed: {}", e))?;
    out.write_all(reloaded.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| format!("writing stdout: {}", e))
}
