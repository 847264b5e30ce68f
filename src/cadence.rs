//! Points-processed event dispatcher.
//!
//! Periodic side effects (progress logging, sample generation, schedule
//! steps, validation) each fire on their own threshold of cumulative points
//! processed within the epoch. The dispatcher is polled once per minibatch
//! with the running point count; each channel fires at most once per poll and
//! then advances its threshold past the current count, so a trigger is never
//! skipped when the batch size does not evenly divide an interval.

/// Named periodic events in the training loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceEvent {
    /// Progress logging.
    Log,
    /// Qualitative sample generation.
    Sample,
    /// Hyperparameter schedule step.
    Schedule,
    /// Validation-metric evaluation.
    Validate,
}

#[derive(Debug, Clone)]
struct Channel {
    event: CadenceEvent,
    interval: usize,
    next_at: usize,
}

/// Dispatcher over the four cadence channels.
///
/// Thresholds are in cumulative points (examples) processed within the
/// current epoch; `reset` rearms every channel at an epoch boundary. No
/// channel fires at zero points.
#[derive(Debug, Clone)]
pub struct Cadence {
    channels: Vec<Channel>,
}

impl Cadence {
    /// Create a dispatcher with one interval per channel.
    ///
    /// # Panics
    ///
    /// Panics if any interval is zero.
    pub fn new(log: usize, sample: usize, schedule: usize, validate: usize) -> Self {
        let channel = |event, interval: usize| {
            assert!(interval > 0, "cadence interval must be positive");
            Channel {
                event,
                interval,
                next_at: interval,
            }
        };
        Self {
            channels: vec![
                channel(CadenceEvent::Log, log),
                channel(CadenceEvent::Sample, sample),
                channel(CadenceEvent::Schedule, schedule),
                channel(CadenceEvent::Validate, validate),
            ],
        }
    }

    /// Poll with the cumulative point count; returns the events due now, in
    /// fixed channel order (Log, Sample, Schedule, Validate).
    pub fn poll(&mut self, points: usize) -> Vec<CadenceEvent> {
        let mut fired = Vec::new();
        for channel in &mut self.channels {
            if points >= channel.next_at {
                fired.push(channel.event);
                // Advance past the current count so one poll fires once.
                let periods = points / channel.interval + 1;
                channel.next_at = periods * channel.interval;
            }
        }
        fired
    }

    /// Rearm every channel for a new epoch.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.next_at = channel.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "cadence interval must be positive")]
    fn test_zero_interval_rejected() {
        Cadence::new(10, 0, 10, 10);
    }

    #[test]
    fn test_never_fires_at_zero_points() {
        let mut cadence = Cadence::new(10, 20, 30, 40);
        assert!(cadence.poll(0).is_empty());
    }

    #[test]
    fn test_fires_on_exact_multiple() {
        let mut cadence = Cadence::new(10, 100, 100, 100);
        assert!(cadence.poll(5).is_empty());
        assert_eq!(cadence.poll(10), vec![CadenceEvent::Log]);
        // Not again until the next multiple.
        assert!(cadence.poll(15).is_empty());
        assert_eq!(cadence.poll(20), vec![CadenceEvent::Log]);
    }

    #[test]
    fn test_fires_when_batch_size_skips_over_threshold() {
        // Batches of 7 points against an interval of 10: the count jumps
        // from 7 to 14 without ever equaling 10, but the event still fires.
        let mut cadence = Cadence::new(10, 1000, 1000, 1000);
        assert!(cadence.poll(7).is_empty());
        assert_eq!(cadence.poll(14), vec![CadenceEvent::Log]);
        assert!(cadence.poll(21).is_empty());
        assert_eq!(cadence.poll(28), vec![CadenceEvent::Log]);
    }

    #[test]
    fn test_multiple_channels_fire_together() {
        let mut cadence = Cadence::new(10, 20, 20, 40);
        assert_eq!(cadence.poll(10), vec![CadenceEvent::Log]);
        assert_eq!(
            cadence.poll(20),
            vec![CadenceEvent::Log, CadenceEvent::Sample, CadenceEvent::Schedule]
        );
        assert_eq!(
            cadence.poll(40),
            vec![
                CadenceEvent::Log,
                CadenceEvent::Sample,
                CadenceEvent::Schedule,
                CadenceEvent::Validate
            ]
        );
    }

    #[test]
    fn test_reset_rearms_channels() {
        let mut cadence = Cadence::new(10, 10, 10, 10);
        assert_eq!(cadence.poll(10).len(), 4);
        cadence.reset();
        assert!(cadence.poll(5).is_empty());
        assert_eq!(cadence.poll(10).len(), 4);
    }

    #[test]
    fn test_large_jump_fires_once_per_channel() {
        let mut cadence = Cadence::new(10, 1000, 1000, 1000);
        // A jump across several multiples fires a single event, then the
        // threshold sits past the current count.
        assert_eq!(cadence.poll(95), vec![CadenceEvent::Log]);
        assert!(cadence.poll(99).is_empty());
        assert_eq!(cadence.poll(100), vec![CadenceEvent::Log]);
    }
}
