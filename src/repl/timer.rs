//! Single-shot timers for delayed quiz transitions

use chordquiz_core::quiz::DeferredAction;
use crossbeam_channel::Sender;
use std::thread;

/// Posts [`DeferredAction`]s back to the REPL loop once their delay has
/// passed.
///
/// Timers can't be cancelled. An action that fires after the quiz moved on
/// is dropped by `Quiz::apply_deferred`.
#[derive(Clone)]
pub struct Timers {
    tx: Sender<DeferredAction>,
}

impl Timers {
    pub fn new(tx: Sender<DeferredAction>) -> Self {
        Self { tx }
    }

    pub fn schedule(&self, action: DeferredAction) {
        log::debug!(
            "Scheduling {:?} for {:?} in {:?}",
            action.kind,
            action.tag,
            action.delay
        );
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(action.delay);
            // The loop has exited if the receiver is gone
            let _ = tx.send(action);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordquiz_core::quiz::{DeferredKind, QuestionTag};
    use crossbeam_channel::unbounded;
    use std::time::{Duration, Instant};

    fn action(index: usize, delay_ms: u64) -> DeferredAction {
        DeferredAction {
            tag: QuestionTag {
                session: 1,
                index,
                attempt: 1,
            },
            kind: DeferredKind::Advance,
            delay: Duration::from_millis(delay_ms),
        }
    }

    #[test]
    fn test_timer_fires_after_delay() {
        let (tx, rx) = unbounded();
        let timers = Timers::new(tx);

        let started = Instant::now();
        timers.schedule(action(0, 30));
        let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();

        assert_eq!(fired, action(0, 30));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_timers_fire_in_delay_order() {
        let (tx, rx) = unbounded();
        let timers = Timers::new(tx);

        timers.schedule(action(1, 150));
        timers.schedule(action(2, 10));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.tag.index, 2);
        assert_eq!(second.tag.index, 1);
    }

    #[test]
    fn test_timer_outliving_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        Timers::new(tx).schedule(action(0, 1));
        thread::sleep(Duration::from_millis(20));
    }
}
