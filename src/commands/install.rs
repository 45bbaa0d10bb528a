//! Install command

use crate::cli::InstallArgs;
use crate::commands::Globals;
use crate::config::Settings;
use crate::error::Result;
use crate::git::GitCloner;
use crate::net::HttpClient;
use crate::operations::InstallOperation;
use crate::ui::{Console, InquirePrompt};

/// Install a package from an archive, URL or repository reference
pub fn run(globals: Globals<'_>, args: InstallArgs) -> Result<()> {
    let settings = Settings::load(globals.init_dir, args.identity.as_deref())?;
    let client = HttpClient::new(&settings.http, !globals.quiet)?;
    let prompt = InquirePrompt::new(args.yes);

    InstallOperation::new(
        &settings.home,
        &client,
        &GitCloner,
        &prompt,
        Console::new(globals.quiet),
    )
    .with_identity(settings.identity.as_deref())
    .execute(&args.reference)?;

    Ok(())
}
