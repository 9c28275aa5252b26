//! Typewriter reveal of a reply, one character per tick.
//!
//! Purely cosmetic: the stored entry always holds the full text. The
//! animation runs as its own task and is aborted when its handle is
//! cancelled or dropped, so a new submission never races an old reveal.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const REVEAL_INTERVAL: Duration = Duration::from_millis(30);

/// Step-by-step reveal state over a fixed text.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            shown: 0,
        }
    }

    /// Shows one more character. Returns false once nothing is left.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.shown += 1;
        true
    }

    pub fn visible(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.chars.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    Progress { id: i64, visible: String },
    Finished { id: i64 },
}

/// Handle to a running reveal. Dropping it stops the animation.
#[derive(Debug)]
pub struct RevealHandle {
    id: i64,
    task: JoinHandle<()>,
}

impl RevealHandle {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts revealing `text` for message `id`, calling `sink` on every tick.
///
/// `sink` returns false when the receiver is gone, which ends the task.
/// `Finished` is sent exactly once, one interval after the last `Progress`.
pub fn spawn_reveal<F>(id: i64, text: &str, interval: Duration, sink: F) -> RevealHandle
where
    F: Fn(RevealEvent) -> bool + Send + 'static,
{
    let mut typewriter = Typewriter::new(text);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the first char appears one interval in.
        ticker.tick().await;

        while typewriter.advance() {
            ticker.tick().await;
            let visible = typewriter.visible();
            if !sink(RevealEvent::Progress { id, visible }) {
                return;
            }
        }

        // The tick that finds nothing left to show ends the reveal.
        ticker.tick().await;
        let _ = sink(RevealEvent::Finished { id });
    });

    RevealHandle { id, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_typewriter_steps_by_char() {
        let mut tw = Typewriter::new("olá");
        assert_eq!(tw.visible(), "");
        assert!(tw.advance());
        assert!(tw.advance());
        assert_eq!(tw.visible(), "ol");
        assert!(tw.advance());
        assert_eq!(tw.visible(), "olá");
        assert!(tw.is_complete());
        assert!(!tw.advance());
        assert_eq!(tw.visible(), "olá");
    }

    #[test]
    fn test_empty_text_is_complete() {
        let mut tw = Typewriter::new("");
        assert!(tw.is_complete());
        assert!(!tw.advance());
    }

    fn collecting_sink() -> (Arc<Mutex<Vec<RevealEvent>>>, impl Fn(RevealEvent) -> bool + Send + 'static) {
        let events = Arc::new(Mutex::new(Vec::<RevealEvent>::new()));
        let sink_events = Arc::clone(&events);
        let sink = move |event: RevealEvent| {
            sink_events.lock().unwrap().push(event);
            true
        };
        (events, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_emits_progress_then_finished() {
        let (events, sink) = collecting_sink();
        let handle = spawn_reveal(7, "abc", REVEAL_INTERVAL, sink);

        tokio::time::sleep(REVEAL_INTERVAL * 10).await;
        assert!(handle.is_finished());

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                RevealEvent::Progress { id: 7, visible: "a".to_string() },
                RevealEvent::Progress { id: 7, visible: "ab".to_string() },
                RevealEvent::Progress { id: 7, visible: "abc".to_string() },
                RevealEvent::Finished { id: 7 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_comes_one_interval_after_last_char() {
        let (events, sink) = collecting_sink();
        let _handle = spawn_reveal(3, "ab", REVEAL_INTERVAL, sink);

        tokio::time::sleep(REVEAL_INTERVAL * 2 + REVEAL_INTERVAL / 2).await;
        {
            let events = events.lock().unwrap();
            assert_eq!(events.len(), 2);
            assert!(!events.contains(&RevealEvent::Finished { id: 3 }));
        }

        tokio::time::sleep(REVEAL_INTERVAL).await;
        assert_eq!(events.lock().unwrap().last(), Some(&RevealEvent::Finished { id: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_reveal() {
        let (events, sink) = collecting_sink();
        let handle = spawn_reveal(1, "a long reply", REVEAL_INTERVAL, sink);

        tokio::time::sleep(REVEAL_INTERVAL * 2 + REVEAL_INTERVAL / 2).await;
        handle.cancel();
        tokio::time::sleep(REVEAL_INTERVAL * 50).await;

        let events = events.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(!events.contains(&RevealEvent::Finished { id: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_sink_ends_task() {
        let handle = spawn_reveal(1, "abc", REVEAL_INTERVAL, |_| false);
        tokio::time::sleep(REVEAL_INTERVAL * 3).await;
        assert!(handle.is_finished());
    }
}
