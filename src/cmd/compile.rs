use std::io::{self, Write};
use std::path::PathBuf;

use snafu::ResultExt;
use tapecalc::GeneratorConfig;
use tapecalc::codegen::DEFAULT_DISPLAY_CELL;

use super::{CliResult, WriteStdoutSnafu, read_input};

/// Compile a NAME=EXPRESSION line into a tape-machine program
#[derive(clap::Args)]
pub struct Args {
  /// Optional file to read from instead of standard input
  #[clap(short, long)]
  file: Option<PathBuf>,

  /// Cell used to print the name and the result
  #[clap(long, default_value_t = DEFAULT_DISPLAY_CELL)]
  display_cell: usize,
}

impl Args {
  pub fn exec(self) -> CliResult<()> {
    let input = read_input(self.file.as_deref())?;
    let line = String::from_utf8_lossy(&input);

    let config = GeneratorConfig {
      display_cell: self.display_cell,
    };
    let compilation = tapecalc::compile_line(&line, &config)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", compilation.program).context(WriteStdoutSnafu)?;
    Ok(())
  }
}
