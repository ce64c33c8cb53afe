//! Contracts the host application has to fulfil. The add-on never talks to the host directly,
//! only through [AddonManager] and the page types defined here.

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

#[cfg(test)]
use mockall::automock;

use crate::config::settings::Settings;

/// Used when the host can't tell which add-on id we were loaded under.
pub const FALLBACK_ADDON_ID: &str = "review_bars";

/// The host's add-on manager.
#[cfg_attr(test, automock)]
pub trait AddonManager {
    /// Maps a module name to the id of the add-on it belongs to.
    fn addon_from_module(&self, module: &str) -> Option<String>;

    fn get_config(&self, addon_id: &str) -> Result<Option<Value>>;

    fn write_config(&self, addon_id: &str, config: &Value) -> Result<()>;

    fn set_config_defaults(&self, addon_id: &str, defaults: &Value) -> Result<()>;

    /// Makes the host open our settings editor instead of its raw config view.
    fn set_config_action(&self, addon_id: &str) -> Result<()>;
}

/// Page the host is about to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPage {
    DeckBrowser,
    Overview,
    Reviewer,
    Other(String),
}

/// Page being assembled by the host. Fragments are appended to `body`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WebContent {
    pub body: String,
}

/// First module the host recognizes decides the id.
pub fn resolve_addon_id(manager: &dyn AddonManager, modules: &[&str]) -> String {
    modules
        .iter()
        .find_map(|module| manager.addon_from_module(module))
        .unwrap_or_else(|| FALLBACK_ADDON_ID.to_string())
}

/// Publishes default settings and the settings-editor entry point. Each step fails on its own.
pub fn register_addon(manager: &dyn AddonManager, addon_id: &str) {
    let defaults = Value::Object(Settings::defaults_object());
    match manager.set_config_defaults(addon_id, &defaults) {
        Ok(_) => info!("Published default settings for {addon_id}"),
        Err(e) => warn!("Failed to publish default settings: {e:?}"),
    }

    if let Err(e) = manager.set_config_action(addon_id) {
        warn!("Failed to register settings editor: {e:?}");
    }
}

#[cfg(test)]
mod host_tests {
    use anyhow::anyhow;
    use mockall::predicate::eq;

    use super::{register_addon, resolve_addon_id, MockAddonManager, FALLBACK_ADDON_ID};

    #[test]
    fn test_resolve_addon_id_first_known_module() {
        let mut manager = MockAddonManager::new();
        manager
            .expect_addon_from_module()
            .with(eq("review_bars.widget"))
            .returning(|_| None);
        manager
            .expect_addon_from_module()
            .with(eq("widget"))
            .returning(|_| Some("1234567".into()));

        assert_eq!(
            resolve_addon_id(&manager, &["review_bars.widget", "widget"]),
            "1234567"
        );
    }

    #[test]
    fn test_resolve_addon_id_fallback() {
        let mut manager = MockAddonManager::new();
        manager.expect_addon_from_module().returning(|_| None);

        assert_eq!(resolve_addon_id(&manager, &["widget"]), FALLBACK_ADDON_ID);
    }

    #[test]
    fn test_register_continues_after_failure() {
        let mut manager = MockAddonManager::new();
        manager
            .expect_set_config_defaults()
            .times(1)
            .returning(|_, defaults| {
                assert_eq!(defaults["goal_per_day"], 200);
                Err(anyhow!("no add-on manager yet"))
            });
        manager
            .expect_set_config_action()
            .with(eq("review_bars"))
            .times(1)
            .returning(|_| Ok(()));

        register_addon(&manager, "review_bars");
    }
}
