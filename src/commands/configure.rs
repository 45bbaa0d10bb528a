//! Configure command

use crate::cli::ConfigureArgs;
use crate::commands::Globals;
use crate::config::Settings;
use crate::error::Result;
use crate::git::GitCloner;
use crate::net::HttpClient;
use crate::operations::ConfigureOperation;
use crate::ui::Console;

pub fn run(globals: Globals<'_>, args: ConfigureArgs) -> Result<()> {
    let settings = Settings::load(globals.init_dir, args.identity.as_deref())?;
    let client = HttpClient::new(&settings.http, !globals.quiet)?;

    ConfigureOperation::new(&settings.home, &client, &GitCloner, Console::new(globals.quiet))
        .with_identity(settings.identity.as_deref())
        .execute(&args.name)?;

    Ok(())
}
