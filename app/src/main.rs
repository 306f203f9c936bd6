use std::process::ExitCode;

use clap::Parser;
use csvmesh_app::{CliArgs, run};

fn main() -> ExitCode {
    run(CliArgs::parse())
}
