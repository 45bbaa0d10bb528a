//! Installed command

use crate::commands::Globals;
use crate::config::Settings;
use crate::error::Result;
use crate::operations::installed;
use crate::ui::Console;

/// List the packages in the home directory
pub fn run(globals: Globals<'_>) -> Result<()> {
    let settings = Settings::load(globals.init_dir, None)?;
    let report = installed::scan(&settings.home)?;
    installed::print(&settings.home, &report, Console::new(globals.quiet));
    Ok(())
}
