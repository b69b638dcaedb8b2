// Startup gate: block until the API reports that the game is online.

use std::thread;
use std::time::Duration;

use crate::api::ApiClient;
use crate::logging::Logger;
use crate::transport::Transport;

/// Wait between two status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Poll the status endpoint every `POLL_INTERVAL` until the game is online.
///
/// There is no attempt limit. Errors are logged and count as "not online
/// yet". `on_wait` is called before each sleep so the caller can tell the
/// user what is happening.
pub fn wait_while_offline<T: Transport>(
    client: &ApiClient<T>,
    logger: &dyn Logger,
    on_wait: impl FnMut(),
) {
    poll_until_online(client, logger, on_wait, || thread::sleep(POLL_INTERVAL));
}

/// Loop body of `wait_while_offline` with the sleep injected. Returns the
/// number of status checks it took.
pub fn poll_until_online<T: Transport>(
    client: &ApiClient<T>,
    logger: &dyn Logger,
    mut on_wait: impl FnMut(),
    mut sleep: impl FnMut(),
) -> u64 {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match client.fetch_status() {
            Ok(status) if status.is_online() => return attempts,
            Ok(status) => logger.infof(format_args!("API not online yet: {}", status.status)),
            Err(e) => logger.error(&format!("Status check failed: {}", e)),
        }
        on_wait();
        sleep();
    }
}
