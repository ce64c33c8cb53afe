use chrono::{Local, NaiveDate};

/// Represents an entity responsible for providing the current calendar date across the add-on.
/// Everything that depends on "today" goes through it so that tests can move the day forward.
pub trait Clock: Sync + Send + 'static {
    fn today(&self) -> NaiveDate;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
