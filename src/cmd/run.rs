use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use snafu::ResultExt;
use tapecalc::machine::DEFAULT_TAPE_LEN;
use tapecalc::{Machine, MachineConfig, Program};

use super::{CliResult, WriteStdoutSnafu, read_input};

/// Execute a tape-machine program
#[derive(clap::Args)]
pub struct Args {
  /// Optional file to read from instead of standard input
  #[clap(short, long)]
  file: Option<PathBuf>,

  /// Number of cells on the tape
  #[clap(long, default_value_t = DEFAULT_TAPE_LEN)]
  tape_len: NonZeroUsize,
}

impl Args {
  pub fn exec(self) -> CliResult<()> {
    let code = read_input(self.file.as_deref())?;
    let program = Program::parse(code)?;

    let mut machine = Machine::new(MachineConfig {
      tape_len: self.tape_len,
    });
    let mut stdout = BufWriter::new(io::stdout().lock());
    machine.run(&program, &mut stdout)?;

    writeln!(stdout).context(WriteStdoutSnafu)?;
    stdout.flush().context(WriteStdoutSnafu)?;
    Ok(())
  }
}
