use std::process;

mod cmd;

fn main() {
  let cli = cmd::Cli::default();

  if let Err(err) = cli.exec() {
    eprintln!("{err}");
    process::exit(1);
  }
}
