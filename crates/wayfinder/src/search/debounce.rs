//! Turns a stream of raw text edits into committed queries.
//!
//! Every `submit` restarts the quiet-period timer. When the timer fires, the
//! pending text is emitted unless it equals the last emitted value. Blank
//! input skips the timer entirely so results can be cleared at once, and it
//! cancels whatever was pending.

use std::time::Duration;

use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep},
};
use tracing::{debug, trace};

use super::state::CommittedQuery;
use crate::error::Result;

/// Handle to a running debounce task.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) stops the
/// task; a pending value is then never emitted.
#[derive(Debug)]
pub struct Debouncer {
    input: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
    quiet_period: Duration,
}

impl Debouncer {
    /// Start a debounce task on the current Tokio runtime.
    ///
    /// Committed queries arrive on the returned receiver in emission order.
    pub fn spawn(quiet_period: Duration) -> Result<(Self, mpsc::UnboundedReceiver<CommittedQuery>)> {
        let runtime = Handle::try_current()?;
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let task = runtime.spawn(run(quiet_period, input_rx, output_tx));
        debug!(?quiet_period, "Debouncer started");

        Ok((
            Self {
                input: input_tx,
                task,
                quiet_period,
            },
            output_rx,
        ))
    }

    /// Offer the latest raw text. Returns `false` once the debouncer is torn down.
    pub fn submit(&self, query: impl Into<String>) -> bool {
        !self.task.is_finished() && self.input.send(query.into()).is_ok()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_shut_down(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Distinct-until-changed gate in front of the output channel.
struct Emitter {
    output: mpsc::UnboundedSender<CommittedQuery>,
    last: Option<CommittedQuery>,
}

impl Emitter {
    /// Returns `false` when nobody is listening any more.
    fn emit(&mut self, query: CommittedQuery) -> bool {
        if self.last.as_ref() == Some(&query) {
            trace!(query = %query, "Suppressing unchanged query");
            return true;
        }
        debug!(query = %query, "Committing query");
        self.last = Some(query.clone());
        self.output.send(query).is_ok()
    }
}

async fn run(
    quiet_period: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<CommittedQuery>,
) {
    let mut emitter = Emitter { output, last: None };
    let mut pending: Option<String> = None;
    let timer = sleep(quiet_period);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            // A keystroke racing the deadline supersedes the pending value.
            biased;

            received = input.recv() => {
                let Some(text) = received else { break };
                if text.trim().is_empty() {
                    pending = None;
                    if !emitter.emit(CommittedQuery::new(text)) {
                        break;
                    }
                } else {
                    trace!(text = %text, "Debounce timer reset");
                    pending = Some(text);
                    timer.as_mut().reset(Instant::now() + quiet_period);
                }
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(text) = pending.take() {
                    if !emitter.emit(CommittedQuery::new(text)) {
                        break;
                    }
                }
            }
        }
    }
    debug!("Debouncer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const QUIET: Duration = Duration::from_millis(300);

    /// Let the debounce task observe everything submitted so far.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_commits_only_last_value() {
        let (debouncer, mut committed) = Debouncer::spawn(QUIET).unwrap();

        for text in ["F", "Fl", "Fli", "Flin"] {
            assert!(debouncer.submit(text));
            settle().await;
            advance(Duration::from_millis(100)).await;
        }
        advance(QUIET).await;
        settle().await;

        assert_eq!(committed.recv().await.unwrap().as_str(), "Flin");
        assert!(committed.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_emitted_before_quiet_period() {
        let (debouncer, mut committed) = Debouncer::spawn(QUIET).unwrap();
        debouncer.submit("Flin");
        settle().await;

        advance(Duration::from_millis(299)).await;
        settle().await;
        assert!(committed.try_recv().is_err());

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(committed.try_recv().unwrap().as_str(), "Flin");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_bypasses_timer_and_cancels_pending() {
        let (debouncer, mut committed) = Debouncer::spawn(QUIET).unwrap();
        debouncer.submit("Flin");
        settle().await;
        debouncer.submit("  ");
        settle().await;

        assert!(committed.try_recv().unwrap().is_blank());

        advance(QUIET * 2).await;
        settle().await;
        assert!(committed.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_value_is_not_reemitted() {
        let (debouncer, mut committed) = Debouncer::spawn(QUIET).unwrap();

        debouncer.submit("Flin");
        settle().await;
        advance(QUIET).await;
        settle().await;
        assert_eq!(committed.try_recv().unwrap().as_str(), "Flin");

        // Edit away and back inside one window: nets out to no change.
        debouncer.submit("Flinders");
        debouncer.submit("Flin");
        settle().await;
        advance(QUIET).await;
        settle().await;
        assert!(committed.try_recv().is_err());

        debouncer.submit("");
        debouncer.submit("");
        settle().await;
        assert!(committed.try_recv().unwrap().is_blank());
        assert!(committed.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_emission_after_shutdown() {
        let (debouncer, mut committed) = Debouncer::spawn(QUIET).unwrap();
        debouncer.submit("Flin");
        settle().await;

        debouncer.shutdown();
        settle().await;
        advance(QUIET * 2).await;
        settle().await;

        assert!(committed.recv().await.is_none());
        assert!(!debouncer.submit("Flinders"));
        assert!(debouncer.is_shut_down());
    }
}
