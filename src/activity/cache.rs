use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    config::{settings::Settings, store::ConfigStore},
    utils::{clock::Clock, time::date_to_key},
};

use super::{aggregator::Aggregator, counts::DailyCounts, log::ActivityLog};

pub const CACHE_KEY_FIELD: &str = "cache_key";
pub const CACHE_COUNTS_FIELD: &str = "cache_counts";

/// Identifies what a cached sequence was computed for.
pub fn cache_key(date: NaiveDate, range_days: u32) -> String {
    format!("{}:{range_days}", date_to_key(date))
}

/// Keeps the last aggregation in the settings object so it survives restarts. Recomputes at most
/// once per calendar day and range, unless forced.
pub struct DailyCountsCache<L: ActivityLog> {
    store: ConfigStore,
    aggregator: Aggregator<L>,
    clock: Arc<dyn Clock>,
}

impl<L: ActivityLog> DailyCountsCache<L> {
    pub fn new(store: ConfigStore, aggregator: Aggregator<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            aggregator,
            clock,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn aggregator_mut(&mut self) -> &mut Aggregator<L> {
        &mut self.aggregator
    }

    /// Counts for the configured range. Disabled add-on gives zeros without touching the log or
    /// the stored cache.
    pub fn get(&self, force: bool) -> DailyCounts {
        let mut settings = self.store.load();
        let days = settings.range_len();

        if !settings.enabled {
            return DailyCounts::zeroed(days as usize);
        }

        let key = cache_key(self.clock.today(), days);
        if !force {
            if let Some(counts) = Self::cached(&settings, &key, days) {
                debug!("Using cached counts for {key}");
                return counts;
            }
        }

        let counts = self.aggregator.compute(days);
        info!("Computed counts for {key}, total {}", counts.total());

        settings
            .extra
            .insert(CACHE_KEY_FIELD.into(), key.into());
        settings
            .extra
            .insert(CACHE_COUNTS_FIELD.into(), counts.to_json());
        self.store.save(&settings);

        counts
    }

    fn cached(settings: &Settings, key: &str, days: u32) -> Option<DailyCounts> {
        let stored_key = settings.extra.get(CACHE_KEY_FIELD)?.as_str()?;
        if stored_key != key {
            debug!("Cache is stale: {stored_key} != {key}");
            return None;
        }

        let counts = settings.extra.get(CACHE_COUNTS_FIELD)?;
        match DailyCounts::from_json(counts) {
            Some(counts) if counts.len() == days as usize => Some(counts),
            _ => {
                debug!("Discarding malformed cached counts {counts}");
                None
            }
        }
    }
}
