//! adaptquiz-runtime: Async driver for quiz sessions.
//!
//! [`run_session`] owns the countdown and engagement timers for one started
//! session and applies learner commands between ticks. Both timers live
//! inside the driver loop, so they stop the moment the session leaves
//! `InProgress` or the command channel closes.

use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use adaptquiz_core::report::SessionSummary;
use adaptquiz_core::session::{Session, SessionSnapshot, SessionStatus, Tick};

/// A learner action forwarded to a running session.
#[derive(Debug)]
pub enum Command {
    /// Choose an option on the current question.
    Answer(String),
    /// Move to the next question.
    Advance,
    /// Request the current hint; the reply is `None` when none was shown.
    Hint(oneshot::Sender<Option<String>>),
    /// Finish early and produce a summary.
    End,
    /// Abandon the session without a summary.
    Reset,
    /// Read the current state.
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Drive a started session until it finishes, is reset, or the command
/// channel closes.
///
/// Returns the summary when the session finished. A closed channel ends
/// the session early; `Reset` returns `None`.
pub async fn run_session<R: Rng>(
    session: &mut Session<R>,
    mut commands: mpsc::Receiver<Command>,
) -> Option<SessionSummary> {
    if session.status() != SessionStatus::InProgress {
        tracing::debug!(status = ?session.status(), "session not in progress, nothing to drive");
        return session.summary().cloned();
    }

    let mut clock = timer(session.config().clock_tick());
    let mut engagement = timer(session.config().engagement_tick());
    let mut presented = session.question_number();

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(command) => apply(session, command),
                None => {
                    tracing::debug!("command channel closed, ending session");
                    session.end();
                }
            },
            _ = clock.tick() => {
                if let Tick::Expired(progress) = session.tick_clock() {
                    tracing::debug!(?progress, "question timed out");
                }
            }
            _ = engagement.tick() => {
                session.tick_engagement();
            }
        }

        if session.status() != SessionStatus::InProgress {
            break;
        }

        // A new question gets a full first second.
        let number = session.question_number();
        if number != presented {
            presented = number;
            clock.reset();
        }
    }

    session.summary().cloned()
}

fn timer(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn apply<R: Rng>(session: &mut Session<R>, command: Command) {
    match command {
        Command::Answer(option_id) => {
            if session.answer(&option_id).is_none() {
                tracing::debug!(option_id = %option_id, "answer ignored");
            }
        }
        Command::Advance => {
            session.advance();
        }
        Command::Hint(reply) => {
            // The requester may have given up waiting.
            let _ = reply.send(session.use_hint());
        }
        Command::End => {
            session.end();
        }
        Command::Reset => session.reset(),
        Command::Snapshot(reply) => {
            let _ = reply.send(session.snapshot());
        }
    }
}
