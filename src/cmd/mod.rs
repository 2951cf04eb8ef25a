use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use snafu::{ResultExt, Snafu};
use tracing::Level;

mod compile;
mod run;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
  #[snafu(display("failed to read {}", path.display()))]
  ReadFile { path: PathBuf, source: io::Error },

  #[snafu(display("failed to read standard input"))]
  ReadStdin { source: io::Error },

  #[snafu(display("failed to write standard output"))]
  WriteStdout { source: io::Error },

  #[snafu(transparent)]
  Compile { source: tapecalc::CompileError },

  #[snafu(transparent)]
  Machine { source: tapecalc::MachineError },
}

pub type CliResult<T> = Result<T, CliError>;

/// Compile arithmetic into tape-machine programs, and run them.
#[derive(Parser)]
#[clap(version, about)]
#[clap(propagate_version = true)]
pub struct Cli {
  /// Log debug details to stderr
  #[clap(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  pub cmd: Cmd,
}

impl Default for Cli {
  fn default() -> Self {
    Self::parse()
  }
}

impl Cli {
  pub fn exec(self) -> CliResult<()> {
    init_tracing(if self.verbose { Level::DEBUG } else { Level::INFO });
    self.cmd.exec()
  }
}

#[derive(clap::Subcommand)]
pub enum Cmd {
  Compile(compile::Args),
  Run(run::Args),
}

impl Cmd {
  pub fn exec(self) -> CliResult<()> {
    match self {
      Cmd::Compile(args) => args.exec(),
      Cmd::Run(args) => args.exec(),
    }
  }
}

/// Read the whole of `file`, or standard input when no file is given.
fn read_input(file: Option<&Path>) -> CliResult<Vec<u8>> {
  match file {
    Some(path) => fs::read(path).context(ReadFileSnafu { path }),
    None => {
      let mut buffer = Vec::new();
      io::stdin()
        .read_to_end(&mut buffer)
        .context(ReadStdinSnafu)?;
      Ok(buffer)
    }
  }
}

fn init_tracing(level: Level) {
  let _ = tracing_subscriber::fmt()
    .without_time()
    .with_target(false)
    .with_writer(io::stderr)
    .with_max_level(level)
    .try_init();
}
