//! Command handlers grouped by concern.

mod compress;
mod config;
mod create;
mod history;

pub(crate) use compress::handle_compress;
pub(crate) use config::{handle_config_get, handle_config_set};
pub(crate) use create::handle_create;
pub(crate) use history::handle_history;

use anyhow::anyhow;
use fieldtree_events::EventBus;
use tokio::task;

use crate::context::{CliError, CliResult};
use crate::output::ProgressRenderer;

/// Run `job` on the blocking pool while rendering events published on `events`.
///
/// Events still queued when the job returns are drained before this returns.
pub(crate) async fn run_with_progress<T, F>(
    events: &EventBus,
    mut renderer: ProgressRenderer,
    job: F,
) -> CliResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let mut stream = events.subscribe();
    let mut handle = task::spawn_blocking(job);

    let joined = loop {
        tokio::select! {
            joined = &mut handle => break joined,
            Some(envelope) = stream.next() => renderer.render(&envelope.event),
        }
    };
    while let Some(envelope) = stream.try_next() {
        renderer.render(&envelope.event);
    }
    renderer.finish();

    joined.map_err(|err| CliError::failure(anyhow!("background job did not complete: {err}")))
}
