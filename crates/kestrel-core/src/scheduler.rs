//! Cadence-gated polling of signal providers.
//!
//! The scheduler owns the providers and their per-signal next-poll
//! bookkeeping. It never sleeps; the supervisor loop paces `poll` calls.

use std::time::{Duration, Instant};

use crate::sample::Sample;

/// A source of one named signal.
///
/// Implementations normalize values into the signal's declared domain and
/// return `valid == false` samples when the underlying facility fails; they
/// never panic out of `read`.
pub trait SignalProvider {
    /// Stable signal identifier.
    fn id(&self) -> &str;

    /// Produce one sample. May issue syscalls or read subprocess pipes.
    fn read(&mut self) -> Sample;
}

struct Registration {
    provider: Box<dyn SignalProvider>,
    interval: Duration,
    last_polled: Option<Instant>,
}

/// Time-driven polling coordinator.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<Registration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider with its polling cadence. The first `poll`
    /// always fires newly registered providers; a zero interval fires on
    /// every poll.
    pub fn register(&mut self, provider: Box<dyn SignalProvider>, interval: Duration) {
        self.entries.push(Registration {
            provider,
            interval,
            last_polled: None,
        });
    }

    /// Read every provider whose cadence has elapsed, in registration
    /// order.
    pub fn poll(&mut self) -> Vec<Sample> {
        let now = Instant::now();
        let mut samples = Vec::new();

        for entry in &mut self.entries {
            let due = match entry.last_polled {
                None => true,
                Some(last) => now.saturating_duration_since(last) >= entry.interval,
            };
            if due {
                samples.push(entry.provider.read());
                entry.last_polled = Some(now);
            }
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Test provider returning a fixed value.
    struct Scripted {
        id: String,
        value: f64,
    }

    impl Scripted {
        fn new(id: &str, value: f64) -> Self {
            Self {
                id: id.to_string(),
                value,
            }
        }
    }

    impl SignalProvider for Scripted {
        fn id(&self) -> &str {
            &self.id
        }

        fn read(&mut self) -> Sample {
            Sample::new(self.id.clone(), self.value, Instant::now())
        }
    }

    #[test]
    fn first_poll_fires_every_provider() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(Scripted::new("a", 0.1)), Duration::from_secs(60));
        scheduler.register(Box::new(Scripted::new("b", 0.2)), Duration::from_secs(60));

        let samples = scheduler.poll();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn samples_come_in_registration_order() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(Scripted::new("first", 0.1)), Duration::ZERO);
        scheduler.register(Box::new(Scripted::new("second", 0.2)), Duration::ZERO);
        scheduler.register(Box::new(Scripted::new("third", 0.3)), Duration::ZERO);

        let ids: Vec<String> = scheduler
            .poll()
            .into_iter()
            .map(|s| s.signal_id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn cadence_gates_subsequent_polls() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(Scripted::new("slow", 0.1)), Duration::from_secs(60));

        assert_eq!(scheduler.poll().len(), 1);
        assert!(scheduler.poll().is_empty());
        assert!(scheduler.poll().is_empty());
    }

    #[test]
    fn zero_interval_fires_every_poll() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(Scripted::new("fast", 0.1)), Duration::ZERO);

        for _ in 0..3 {
            assert_eq!(scheduler.poll().len(), 1);
        }
    }

    #[test]
    fn provider_fires_again_after_its_interval() {
        let mut scheduler = Scheduler::new();
        scheduler.register(
            Box::new(Scripted::new("s", 0.5)),
            Duration::from_millis(10),
        );

        assert_eq!(scheduler.poll().len(), 1);
        assert!(scheduler.poll().is_empty());

        thread::sleep(Duration::from_millis(15));
        assert_eq!(scheduler.poll().len(), 1);
    }

    #[test]
    fn mixed_cadences_fire_independently() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(Scripted::new("every", 0.1)), Duration::ZERO);
        scheduler.register(Box::new(Scripted::new("rare", 0.2)), Duration::from_secs(60));

        assert_eq!(scheduler.poll().len(), 2);

        let second = scheduler.poll();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].signal_id, "every");
    }
}
