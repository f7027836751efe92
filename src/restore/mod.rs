mod logic;
pub(crate) mod db_restore;
pub(crate) mod decompress;

pub use logic::RestoreOutcome;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::utils::console::TerminalConsole;
use crate::utils::process::SystemRunner;
use db_restore::Connections;
use logic::RestoreCommand;

/// Public entry point for the restore process: restores `dump` into the
/// selected connection, or lists the saved dumps when `dump` is `None`.
pub fn run_restore_flow(
    app_config: &AppConfig,
    connection: Option<&str>,
    dump: Option<&str>,
) -> Result<RestoreOutcome> {
    let runner = SystemRunner;
    let connections = Connections::new(&app_config.restore, &runner);
    let mut console = TerminalConsole;

    RestoreCommand::new(&app_config.restore, &connections, &runner, &mut console)
        .run(connection, dump)
}
