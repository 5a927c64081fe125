//! One-shot session timers, at most one live timer per kind
//!
//! Arming a kind cancels whatever timer of that kind was pending. Each armed
//! timer gets a fresh id; a fire notification is only honoured if its id still
//! occupies the slot, so a timer cancelled after it already fired is ignored.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Kinds of session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Quiet period after the last partial result
    Silence,
    /// No input at all; ends the session
    NoSpeech,
    /// Bounded latency once meaningful speech started
    ForceProcess,
    /// Speaking phase took too long
    Watchdog,
    /// Re-enter listening after an assistant failure
    Retry,
}

impl TimerKind {
    pub const ALL: [TimerKind; 5] = [
        TimerKind::Silence,
        TimerKind::NoSpeech,
        TimerKind::ForceProcess,
        TimerKind::Watchdog,
        TimerKind::Retry,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::Silence => 0,
            TimerKind::NoSpeech => 1,
            TimerKind::ForceProcess => 2,
            TimerKind::Watchdog => 3,
            TimerKind::Retry => 4,
        }
    }
}

/// Notification that a timer elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub id: u64,
}

struct ArmedTimer {
    id: u64,
    task: JoinHandle<()>,
}

/// Fixed table of timers keyed by kind
pub struct TimerTable {
    slots: [Option<ArmedTimer>; 5],
    next_id: u64,
    on_fire: Arc<dyn Fn(TimerFired) + Send + Sync>,
}

impl TimerTable {
    /// `on_fire` runs on the timer task when a timer elapses
    pub fn new(on_fire: impl Fn(TimerFired) + Send + Sync + 'static) -> Self {
        Self {
            slots: Default::default(),
            next_id: 0,
            on_fire: Arc::new(on_fire),
        }
    }

    /// Arm `kind` to fire after `delay`, replacing any pending timer of that kind
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        self.cancel(kind);

        self.next_id += 1;
        let id = self.next_id;
        let deadline = Instant::now() + delay;
        let on_fire = Arc::clone(&self.on_fire);

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire(TimerFired { kind, id });
        });

        trace!("Armed {:?} timer #{} ({}ms)", kind, id, delay.as_millis());
        self.slots[kind.slot()] = Some(ArmedTimer { id, task });
        id
    }

    /// Cancel the pending timer of `kind`, if any
    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.slots[kind.slot()].take() {
            timer.task.abort();
            trace!("Cancelled {:?} timer #{}", kind, timer.id);
        }
    }

    /// Cancel every pending timer
    pub fn clear_all(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Accept a fire notification, freeing its slot
    ///
    /// Returns false when the timer was cancelled or replaced in the meantime.
    pub fn acknowledge(&mut self, fired: TimerFired) -> bool {
        let slot = &mut self.slots[fired.kind.slot()];
        match slot {
            Some(timer) if timer.id == fired.id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for TimerTable {
    fn drop(&mut self) {
        self.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn table() -> (TimerTable, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = TimerTable::new(move |fired| {
            let _ = tx.send(fired);
        });
        (table, rx)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (mut timers, mut rx) = table();
        let id = timers.arm(TimerKind::Silence, Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert!(rx.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        let fired = rx.try_recv().unwrap();
        assert_eq!(fired, TimerFired { kind: TimerKind::Silence, id });
        assert!(timers.acknowledge(fired));
        assert!(!timers.is_armed(TimerKind::Silence));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_cancels_previous() {
        let (mut timers, mut rx) = table();
        timers.arm(TimerKind::Silence, Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(600)).await;
        let second = timers.arm(TimerKind::Silence, Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert!(rx.try_recv().is_err(), "first timer must not fire");

        tokio::time::advance(Duration::from_millis(400)).await;
        settle().await;
        let fired = rx.try_recv().unwrap();
        assert_eq!(fired.id, second);
        assert!(rx.try_recv().is_err());
        assert_eq!(timers.armed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_independent() {
        let (mut timers, mut rx) = table();
        timers.arm(TimerKind::Silence, Duration::from_millis(100));
        timers.arm(TimerKind::NoSpeech, Duration::from_millis(200));
        assert_eq!(timers.armed_count(), 2);

        tokio::time::advance(Duration::from_millis(250)).await;
        settle().await;

        let mut kinds = vec![rx.try_recv().unwrap().kind, rx.try_recv().unwrap().kind];
        kinds.sort_by_key(|k| k.slot());
        assert_eq!(kinds, vec![TimerKind::Silence, TimerKind::NoSpeech]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_cancels_everything() {
        let (mut timers, mut rx) = table();
        for kind in TimerKind::ALL {
            timers.arm(kind, Duration::from_millis(50));
        }
        timers.clear_all();
        assert_eq!(timers.armed_count(), 0);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fire_is_rejected() {
        let (mut timers, mut rx) = table();
        timers.arm(TimerKind::Watchdog, Duration::from_millis(10));

        tokio::time::advance(Duration::from_millis(10)).await;
        settle().await;
        let fired = rx.try_recv().unwrap();

        // Replaced before the notification was handled
        timers.arm(TimerKind::Watchdog, Duration::from_millis(10));
        assert!(!timers.acknowledge(fired));
        assert!(timers.is_armed(TimerKind::Watchdog));
    }
}
