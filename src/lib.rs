//! Bar chart of daily review counts for the host's deck list page.
//! Counts come from the host's review log, are cached once per day in the add-on's settings
//! file, and get refreshed when a review session that answered something ends.
//!

pub mod activity;
pub mod config;
pub mod editor;
pub mod host;
pub mod render;
pub mod utils;
pub mod widget;
