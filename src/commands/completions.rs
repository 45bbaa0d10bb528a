//! Shell completions command

use clap::{CommandFactory, ValueEnum};
use clap_complete::Shell;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::{MlhubError, Result};

/// Name completions are registered under
const BIN_NAME: &str = "ml";

/// Shell by name, case-insensitively; `pwsh` is PowerShell
fn parse_shell(name: &str) -> Result<Shell> {
    if name.eq_ignore_ascii_case("pwsh") {
        return Ok(Shell::PowerShell);
    }
    <Shell as ValueEnum>::from_str(name, true).map_err(|_| MlhubError::UnknownShell {
        shell: name.to_string(),
    })
}

/// Write the completion script for the requested shell to stdout
pub fn run(args: CompletionsArgs) -> Result<()> {
    let shell = parse_shell(&args.shell)?;
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout().lock());
    Ok(())
}
