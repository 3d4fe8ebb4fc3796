//! The `watch` command: reminder delivery with a location feed on stdin.

use crate::app::{spawn_reminder_loop, App};
use crate::cli::run::{error_output, json_output, parse_at, CliContext, CliOutput};
use crate::location::{Coordinates, LocationTracker};
use crate::reminders::Notification;
use crate::traits::{Clock, Notifier, ShiftedClock};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

/// Prints each notification's message on its own stdout line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, notification: &Notification) {
        println!("{}", notification.message);
    }
}

/// Read `lat, lon` lines from `reader` into `tracker` until end of input.
///
/// Blank lines are skipped and malformed ones logged. Returns how many fixes
/// were applied.
///
/// # Errors
///
/// Returns an error if reading fails.
pub async fn follow_locations<R>(tracker: &LocationTracker, reader: R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut fixes = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Coordinates::parse(line) {
            Ok(fix) => {
                tracker.update(fix);
                fixes += 1;
            }
            Err(e) => tracing::warn!(line, "{e}"),
        }
    }
    Ok(fixes)
}

/// Poll once at `--at` (or now) and print what would be delivered.
pub(super) fn poll_once(app: &mut App, ctx: &CliContext, at: Option<&str>) -> CliOutput {
    let now = match at.map(parse_at).transpose() {
        Ok(at) => at.unwrap_or_else(|| ctx.clock.now()),
        Err(e) => return error_output(e),
    };
    let fired = app.poll_reminders(now);
    let delivered: Vec<Notification> =
        if app.settings().notifications { fired } else { Vec::new() };
    json_output(&delivered)
}

/// Poll on the configured interval until stdin closes.
pub(super) async fn run_watch(ctx: &CliContext, at: Option<&str>) -> CliOutput {
    let clock: Arc<dyn Clock> = match at.map(parse_at).transpose() {
        Ok(Some(start)) => Arc::new(ShiftedClock::starting_at(start)),
        Ok(None) => Arc::clone(&ctx.clock),
        Err(e) => return error_output(e),
    };
    let app = match ctx.open_app(Box::new(StdoutNotifier)) {
        Ok(app) => app,
        Err(e) => return error_output(e.to_string()),
    };
    let tracker = app.location().clone();
    let interval = ctx.config.poll_interval();
    tracing::info!(interval_secs = interval.as_secs(), "watching for reminders");

    let shutdown = Arc::new(Notify::new());
    let handle =
        spawn_reminder_loop(Arc::new(Mutex::new(app)), clock, interval, Arc::clone(&shutdown));

    let followed = follow_locations(&tracker, BufReader::new(tokio::io::stdin())).await;
    shutdown.notify_one();
    if let Err(e) = handle.await {
        return error_output(format!("Reminder loop failed: {e}"));
    }

    match followed {
        Ok(fixes) => CliOutput {
            exit_code: ExitCode::SUCCESS,
            stdout: vec![],
            stderr: vec![format!("Stopped watching ({fixes} location updates)")],
        },
        Err(e) => error_output(format!("Error reading stdin: {e}")),
    }
}
