#![allow(missing_docs, clippy::print_stdout, clippy::print_stderr)]
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use oasplit_core::Document;
use oasplit_core::compare::compare_files;
use oasplit_core::graph::check_cycles;
use oasplit_core::split::{Decomposer, DocumentSplitExt, SplitConfig, write_layout};

const USAGE: &str = "\
Usage:
  oasplit decompose <input> [-o|--output <dir>] [--shared-label <label>]
  oasplit check-cycles [<root>]
  oasplit compare <left> <right>

Set RUST_LOG to change the log level (default: info).";

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = Command::parse().context("parsing arguments")?;
    let code = match command {
        Command::Help => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Command::Decompose {
            input,
            output,
            shared_label,
        } => decompose(&input, output, shared_label)?,
        Command::CheckCycles { root } => {
            let report = check_cycles(&root)
                .with_context(|| format!("checking cycles below '{}'", root.display()))?;
            if report.is_clean() {
                println!("{report}");
                ExitCode::SUCCESS
            } else {
                eprintln!("{report}");
                ExitCode::FAILURE
            }
        }
        Command::Compare { left, right } => {
            let comparison = compare_files(&left, &right).context("comparing files")?;
            if comparison.identical {
                println!("{comparison}");
                ExitCode::SUCCESS
            } else {
                eprintln!("{comparison}");
                ExitCode::FAILURE
            }
        }
    };
    Ok(code)
}

fn decompose(input: &Path, output: Option<PathBuf>, shared_label: Option<String>) -> Result<ExitCode> {
    let output = output.unwrap_or_else(|| match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    });
    let mut config = SplitConfig::default();
    if let Some(label) = shared_label {
        config = config.with_shared_label(label);
    }

    let document = Document::load(input)
        .with_context(|| format!("loading '{}'", input.display()))?;
    let result = document.split_with(Decomposer::new(config.clone()));
    write_layout(&result, &output, &config)
        .with_context(|| format!("writing layout to '{}'", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        files = result.fragment_count() + 1,
        "Done"
    );
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug)]
enum Command {
    Help,
    Decompose {
        input: PathBuf,
        output: Option<PathBuf>,
        shared_label: Option<String>,
    },
    CheckCycles {
        root: PathBuf,
    },
    Compare {
        left: PathBuf,
        right: PathBuf,
    },
}

impl Command {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();
        if pargs.contains(["-h", "--help"]) {
            return Ok(Self::Help);
        }

        let subcommand: Option<String> = pargs.subcommand().context("parsing command")?;
        let result = match subcommand.as_deref() {
            Some("decompose") => {
                let output = pargs
                    .opt_value_from_os_str(["-o", "--output"], parse_path)
                    .context("parsing output argument")?;
                let shared_label = pargs
                    .opt_value_from_str("--shared-label")
                    .context("parsing shared label argument")?;
                let input = pargs
                    .free_from_os_str(parse_path)
                    .context("missing input document")?;
                Self::Decompose {
                    input,
                    output,
                    shared_label,
                }
            }
            Some("check-cycles") => {
                let root = pargs
                    .opt_free_from_os_str(parse_path)
                    .context("parsing root argument")?;
                Self::CheckCycles {
                    root: root.unwrap_or_else(|| PathBuf::from(".")),
                }
            }
            Some("compare") => {
                let left = pargs
                    .free_from_os_str(parse_path)
                    .context("missing first file")?;
                let right = pargs
                    .free_from_os_str(parse_path)
                    .context("missing second file")?;
                Self::Compare { left, right }
            }
            Some(other) => bail!("unknown command '{other}'\n\n{USAGE}"),
            None => bail!("missing command\n\n{USAGE}"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}

#[allow(clippy::unnecessary_wraps)]
fn parse_path(value: &std::ffi::OsStr) -> Result<PathBuf, &'static str> {
    Ok(PathBuf::from(value))
}
