//! Remove command

use crate::cli::RemoveArgs;
use crate::commands::Globals;
use crate::config::Settings;
use crate::error::Result;
use crate::operations::RemoveOperation;
use crate::ui::{Console, InquirePrompt};

pub fn run(globals: Globals<'_>, args: RemoveArgs) -> Result<()> {
    let settings = Settings::load(globals.init_dir, None)?;
    let prompt = InquirePrompt::new(false);

    RemoveOperation::new(&settings.home, &prompt, args.yes, Console::new(globals.quiet))
        .execute(&args.name)?;

    Ok(())
}
