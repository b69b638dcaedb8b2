// Entrypoint for the CLI application.
// - Settings and the log file come first; failing either aborts the process.
// - Then the context is built, we wait for the API and hand over to the UI.

use anyhow::Context;
use space_kraken::config::{Paths, Settings};
use space_kraken::context::App;
use space_kraken::logging::{self, Logger, TracingLogger};
use space_kraken::{poller, ui};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let paths = Paths::resolve();
    paths.ensure()?;

    let settings = Settings::load_or_create(&paths.settings_file())?;
    logging::init(&settings.logging, &paths.log_file())?;

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let mut app = App::bootstrap(settings, &paths, logger.clone())
        .context("Failed to initialize the application")?;

    println!("Checking api status");
    poller::wait_while_offline(&app.client, logger.as_ref(), || {
        println!("Waiting for api to come online")
    });
    println!("api is online, the game is available to play");

    ui::prompt_loop(&mut app)
}
