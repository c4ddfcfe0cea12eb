use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::Cli;

pub fn run(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut command = Cli::command();
    generate(shell, &mut command, "spinroom", &mut std::io::stdout());
    Ok(())
}
