use std::sync::Arc;

use tracing::{debug, warn};

use crate::utils::{
    clock::Clock,
    time::{epoch_day, window_start},
};

use super::{
    counts::DailyCounts,
    log::{ActivityLog, DayWindow},
};

/// Counts activity per day over the trailing range that ends today.
pub struct Aggregator<L: ActivityLog> {
    log: L,
    clock: Arc<dyn Clock>,
}

impl<L: ActivityLog> Aggregator<L> {
    pub fn new(log: L, clock: Arc<dyn Clock>) -> Self {
        Self { log, clock }
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    /// Returns exactly `range_days` counts (at least one), oldest day first. Days are epoch-day
    /// buckets of the event timestamps, not local calendar days. An unavailable log yields zeros.
    pub fn compute(&self, range_days: u32) -> DailyCounts {
        let days = range_days.max(1);
        let today = self.clock.today();
        let start_day = epoch_day(window_start(today, days));
        let end_day = epoch_day(today);

        let mut counts = DailyCounts::zeroed(days as usize);

        let buckets = match self
            .log
            .count_by_day(DayWindow::from_epoch_days(start_day, end_day))
        {
            Ok(v) => v,
            Err(e) => {
                warn!("Activity log unavailable, using zeros: {e:?}");
                return counts;
            }
        };

        for bucket in buckets {
            let index = bucket.epoch_day - start_day;
            if (0..i64::from(days)).contains(&index) {
                counts.add(index as usize, bucket.count);
            } else {
                debug!("Discarding out of range bucket {bucket:?}");
            }
        }

        counts
    }
}
