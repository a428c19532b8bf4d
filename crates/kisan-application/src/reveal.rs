//! Typewriter-style reveal of an answer that is already fully known.
//!
//! Each reveal runs as its own task and owns a `CancellationToken`; starting a
//! new submission cancels the previous reveal so two never interleave.

use std::time::Duration;

use kisan_core::config::DEFAULT_REVEAL_INTERVAL_MS;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::events::{AppEvent, EventSink};

/// Trailing marker shown while the reveal is in progress.
pub const CURSOR: char = '▌';

/// How a reveal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Cancelled,
}

/// Frames of a reveal, one more character each time.
///
/// Every frame but the last carries the trailing [`CURSOR`]; the last frame is
/// exactly the answer.
#[derive(Debug, Clone)]
pub struct RevealFrames {
    answer: String,
    ends: Vec<usize>,
    next: usize,
    finished: bool,
}

impl RevealFrames {
    pub fn new(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        let ends = answer
            .char_indices()
            .map(|(idx, ch)| idx + ch.len_utf8())
            .collect();
        Self {
            answer,
            ends,
            next: 0,
            finished: false,
        }
    }
}

impl Iterator for RevealFrames {
    /// `(displayed text, done)`
    type Item = (String, bool);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(&end) = self.ends.get(self.next) else {
            // Empty answer: a single final frame.
            self.finished = true;
            return Some((String::new(), true));
        };
        self.next += 1;

        if self.next == self.ends.len() {
            self.finished = true;
            return Some((self.answer.clone(), true));
        }

        let mut frame = String::with_capacity(end + CURSOR.len_utf8());
        frame.push_str(&self.answer[..end]);
        frame.push(CURSOR);
        Some((frame, false))
    }
}

/// Starts reveals at a fixed per-character interval.
#[derive(Debug, Clone)]
pub struct RevealEffect {
    interval: Duration,
}

impl Default for RevealEffect {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS))
    }
}

impl RevealEffect {
    pub fn new(interval: Duration) -> Self {
        // tokio::time::interval panics on a zero period.
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Spawns the reveal task, emitting one `AppEvent::RevealFrame` per tick.
    pub fn start(&self, answer: impl Into<String>, events: EventSink) -> RevealHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let period = self.interval;
        let frames = RevealFrames::new(answer);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for (text, done) in frames {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        tracing::debug!("[Reveal] Cancelled");
                        return RevealOutcome::Cancelled;
                    }
                    _ = ticker.tick() => {}
                }
                events.emit(AppEvent::RevealFrame { text, done });
            }
            RevealOutcome::Completed
        });

        RevealHandle { token, task }
    }
}

/// Handle to a running reveal.
pub struct RevealHandle {
    token: CancellationToken,
    task: JoinHandle<RevealOutcome>,
}

impl RevealHandle {
    /// Stops the reveal before its next frame.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the reveal to end.
    pub async fn wait(self) -> RevealOutcome {
        self.task.await.unwrap_or(RevealOutcome::Cancelled)
    }
}
