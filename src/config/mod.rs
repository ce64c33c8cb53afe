//! Settings of the add-on. [settings::Settings] is the typed view with defaults,
//! [store::ConfigStore] persists it as one flat json object next to the add-on.

pub mod settings;
pub mod store;

pub use settings::Settings;
