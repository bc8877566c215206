/*
 * Debug Information Module
 *
 * Per-tick statistics reported by the flocking engine and aggregated by the
 * runner:
 * - Agent count and occupied grid cells
 * - Contacts resolved by the hard collision pass
 * - Coincident pairs that needed a random split
 * - Wall-clock time spent in the tick
 *
 * Residual overlap is not part of a tick; it is measured on demand through
 * `FlockingEngine::max_overlap` when a report needs it.
 */

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub agents: usize,
    pub occupied_cells: usize,
    pub contacts: usize,
    pub degenerate_contacts: usize,
    pub elapsed: Duration,
}

/// Output of one collision resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionStats {
    pub contacts: usize,
    pub degenerate_contacts: usize,
}

/// Running totals over many ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    pub ticks: u64,
    pub contacts: u64,
    pub degenerate_contacts: u64,
    pub total_elapsed: Duration,
}

impl StatsAccumulator {
    pub fn record(&mut self, stats: &TickStats) {
        self.ticks += 1;
        self.contacts += stats.contacts as u64;
        self.degenerate_contacts += stats.degenerate_contacts as u64;
        self.total_elapsed += stats.elapsed;
    }

    pub fn mean_tick_time(&self) -> Duration {
        if self.ticks == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_elapsed.as_secs_f64() / self.ticks as f64)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_tracks_totals() {
        let mut acc = StatsAccumulator::default();
        assert_eq!(acc.mean_tick_time(), Duration::ZERO);

        acc.record(&TickStats {
            contacts: 3,
            elapsed: Duration::from_millis(2),
            ..TickStats::default()
        });
        acc.record(&TickStats {
            contacts: 1,
            degenerate_contacts: 1,
            elapsed: Duration::from_millis(4),
            ..TickStats::default()
        });

        assert_eq!(acc.ticks, 2);
        assert_eq!(acc.contacts, 4);
        assert_eq!(acc.degenerate_contacts, 1);
        assert!((acc.mean_tick_time().as_secs_f64() - 0.003).abs() < 1e-9);

        acc.reset();
        assert_eq!(acc.ticks, 0);
    }

    #[test]
    fn mean_tick_time_survives_tick_counts_past_u32() {
        let acc = StatsAccumulator {
            ticks: 1 << 32,
            total_elapsed: Duration::from_secs(1 << 33),
            ..StatsAccumulator::default()
        };
        assert_eq!(acc.mean_tick_time(), Duration::from_secs(2));
    }
}
