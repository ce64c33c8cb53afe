//! Daily activity counting. [aggregator::Aggregator] buckets the host's activity log into epoch
//! days, [cache::DailyCountsCache] keeps one result per calendar day and range.

pub mod aggregator;
pub mod cache;
pub mod counts;
pub mod log;
