//! The add-on as the host sees it. [ChartWidget] owns the cache and the session state and
//! answers host signals; [install] wires everything up from host services.

use std::{path::Path, sync::Arc};

use anyhow::anyhow;
use session::SessionState;
use signals::{HostSignal, SignalHandler, SignalModule};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    activity::{aggregator::Aggregator, cache::DailyCountsCache, counts::DailyCounts, log::ActivityLog},
    config::{
        settings::Settings,
        store::{ConfigStore, SettingsMirror},
    },
    editor::SettingsForm,
    host::{register_addon, resolve_addon_id, AddonManager, HostPage, WebContent},
    render::{html::DisplayFragment, render},
    utils::{
        clock::{Clock, DefaultClock},
        logging::{enable_logging, ADDON_PREFIX},
    },
};

pub mod session;
pub mod signals;

/// The only page the chart is shown on.
pub const TARGET_PAGE: HostPage = HostPage::DeckBrowser;

const SIGNAL_QUEUE: usize = 32;

pub struct ChartWidget<L: ActivityLog> {
    cache: DailyCountsCache<L>,
    session: SessionState,
    clock: Arc<dyn Clock>,
}

impl<L: ActivityLog> ChartWidget<L> {
    pub fn new(cache: DailyCountsCache<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            session: SessionState::default(),
            clock,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn cache(&self) -> &DailyCountsCache<L> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut DailyCountsCache<L> {
        &mut self.cache
    }

    pub fn on_activity_recorded(&mut self) {
        self.session.mark_dirty();
    }

    /// Refreshes the counts if the session recorded anything. Returns the fresh counts.
    pub fn on_session_ended(&mut self) -> Option<DailyCounts> {
        if !self.session.end() {
            debug!("Session ended without activity");
            return None;
        }
        Some(self.cache.get(true))
    }

    /// Fragment for `page`, or nothing when the page isn't ours or the add-on is disabled.
    pub fn fragment_for(&self, page: Option<&HostPage>) -> Option<DisplayFragment> {
        if page != Some(&TARGET_PAGE) {
            return None;
        }
        let settings = self.cache.store().load();
        if !settings.enabled {
            return None;
        }

        let counts = self.cache.get(false);
        Some(render(counts, &settings, self.clock.today()))
    }

    pub fn on_content_requested(&self, page: Option<&HostPage>, content: &mut WebContent) {
        if let Some(fragment) = self.fragment_for(page) {
            content.body.push_str(&fragment.to_string());
        }
    }

    /// Form for the settings dialog, filled with the current settings.
    pub fn open_settings(&self) -> SettingsForm {
        SettingsForm::load_current(&self.cache.store().load())
    }

    /// Saves what the dialog exported.
    pub fn on_settings_saved(&self, settings: Settings) {
        info!("Saving settings");
        self.cache.store().save(&settings);
    }
}

impl<L: ActivityLog> SignalHandler for ChartWidget<L> {
    fn handle(&mut self, signal: HostSignal) -> anyhow::Result<()> {
        match signal {
            HostSignal::ContentRequested { page, reply } => reply
                .send(self.fragment_for(page.as_ref()))
                .map_err(|_| anyhow!("Content requester is gone")),
            HostSignal::ActivityRecorded => {
                self.on_activity_recorded();
                Ok(())
            }
            HostSignal::SessionEnded => {
                self.on_session_ended();
                Ok(())
            }
            HostSignal::SettingsSaved(settings) => {
                self.on_settings_saved(settings);
                Ok(())
            }
        }
    }
}

/// Builds the widget for the add-on living in `addon_dir`: publishes defaults and the settings
/// entry point to the host, and mirrors saved settings into the host's config facility.
pub fn install<L: ActivityLog>(
    manager: Arc<dyn AddonManager>,
    modules: &[&str],
    addon_dir: &Path,
    log: L,
) -> ChartWidget<L> {
    if let Err(e) = enable_logging(ADDON_PREFIX, addon_dir, None, true) {
        warn!("Keeping the existing log subscriber: {e}");
    }
    let addon_id = resolve_addon_id(manager.as_ref(), modules);
    register_addon(manager.as_ref(), &addon_id);

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = ConfigStore::in_addon_dir(addon_dir)
        .with_mirror(SettingsMirror::new(manager, addon_id.clone()));
    let aggregator = Aggregator::new(log, clock.clone());

    info!("Installed add-on {addon_id}");
    ChartWidget::new(DailyCountsCache::new(store, aggregator, clock.clone()), clock)
}

/// Channel the host pushes signals into, and the module that drains it into `widget`.
pub fn signal_channel<L: ActivityLog>(
    widget: ChartWidget<L>,
) -> (mpsc::Sender<HostSignal>, SignalModule<ChartWidget<L>>) {
    let (sender, receiver) = mpsc::channel(SIGNAL_QUEUE);
    (sender, SignalModule::new(receiver, widget))
}

#[cfg(test)]
mod widget_tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::oneshot;

    use crate::{
        activity::{
            aggregator::Aggregator,
            cache::{DailyCountsCache, CACHE_COUNTS_FIELD},
            counts::DailyCounts,
            log::{log_tests::review_log_with, DayCount, MockActivityLog, SqliteActivityLog, REVIEW_LOG},
        },
        config::{settings::Settings, store::ConfigStore},
        host::{HostPage, MockAddonManager, WebContent},
        utils::{
            clock::test_clock::TestClock,
            logging::TEST_LOGGING,
            runtime::single_thread_runtime,
            time::{epoch_day, MS_PER_DAY},
        },
    };

    use super::{install, session::SessionState, signal_channel, signals::HostSignal, ChartWidget};

    fn test_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
    }

    fn widget<L: crate::activity::log::ActivityLog>(
        log: L,
        settings: Settings,
    ) -> Result<(TempDir, ChartWidget<L>)> {
        let dir = tempdir()?;
        let store = ConfigStore::in_addon_dir(dir.path());
        store.save(&settings);
        let clock = Arc::new(TestClock::new(test_today()));
        let cache = DailyCountsCache::new(store, Aggregator::new(log, clock.clone()), clock.clone());
        Ok((dir, ChartWidget::new(cache, clock)))
    }

    #[test]
    fn test_five_reviews_two_days_ago_end_to_end() -> Result<()> {
        let day = epoch_day(test_today()) - 2;
        let timestamps = (0..5).map(|i| day * MS_PER_DAY + i).collect::<Vec<_>>();
        let log = SqliteActivityLog::new(review_log_with(&timestamps)?, REVIEW_LOG);
        let settings = Settings {
            range_days: 7,
            goal_per_day: 3,
            ..Settings::default()
        };
        let (_dir, widget) = widget(log, settings)?;

        assert_eq!(*widget.cache().get(false), [0, 0, 0, 0, 5, 0, 0]);

        let mut content = WebContent::default();
        widget.on_content_requested(Some(&HostPage::DeckBrowser), &mut content);
        assert!(content.body.contains("Last 7 days: 5 reviews"));
        assert!(content
            .body
            .contains("class='rb-bar rb-goalmet' data-date='2024-04-03' data-count='5'"));
        Ok(())
    }

    #[test]
    fn test_absurd_persisted_range_still_renders() -> Result<()> {
        let today = epoch_day(test_today());
        let log = SqliteActivityLog::new(review_log_with(&[today * MS_PER_DAY])?, REVIEW_LOG);
        let (_dir, widget) = widget(log, Settings::default())?;
        std::fs::write(
            widget.cache().store().path(),
            r#"{"range_days": 100000000, "goal_per_day": 1.0}"#,
        )?;

        let fragment = widget
            .fragment_for(Some(&HostPage::DeckBrowser))
            .map(|v| v.to_string())
            .unwrap_or_default();
        assert!(fragment.contains("Last 30 days: 1 reviews"));
        assert_eq!(fragment.matches("class='rb-bar").count(), 30);
        assert!(fragment.contains("class='rb-bar rb-goalmet rb-today'"));
        Ok(())
    }

    #[test]
    fn test_other_pages_get_nothing() -> Result<()> {
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().never();
        let (_dir, widget) = widget(log, Settings::default())?;

        for page in [
            None,
            Some(HostPage::Reviewer),
            Some(HostPage::Overview),
            Some(HostPage::Other("DeckBrowser".into())),
        ] {
            let mut content = WebContent {
                body: "<p>host</p>".into(),
            };
            widget.on_content_requested(page.as_ref(), &mut content);
            assert_eq!(content.body, "<p>host</p>");
        }
        Ok(())
    }

    #[test]
    fn test_disabled_renders_nothing_and_skips_aggregation() -> Result<()> {
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().never();
        let settings = Settings {
            enabled: false,
            ..Settings::default()
        };
        let (_dir, mut widget) = widget(log, settings)?;

        assert!(widget.fragment_for(Some(&HostPage::DeckBrowser)).is_none());
        assert_eq!(*widget.cache().get(false), [0; 30]);

        widget.on_activity_recorded();
        assert_eq!(widget.on_session_ended(), Some(DailyCounts::zeroed(30)));
        Ok(())
    }

    #[test]
    fn test_session_end_while_clean_is_noop() -> Result<()> {
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().never();
        let (_dir, mut widget) = widget(log, Settings::default())?;

        assert_eq!(widget.on_session_ended(), None);
        assert!(widget.cache().store().load().extra.get(CACHE_COUNTS_FIELD).is_none());
        Ok(())
    }

    #[test]
    fn test_many_answers_one_refresh() -> Result<()> {
        let today = epoch_day(test_today());
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().times(1).returning(move |_| {
            Ok(vec![DayCount {
                epoch_day: today,
                count: 42,
            }])
        });
        let (_dir, mut widget) = widget(log, Settings::default())?;

        for _ in 0..100 {
            widget.on_activity_recorded();
        }
        assert_eq!(widget.session(), SessionState::Dirty);

        let counts = widget.on_session_ended();
        assert_eq!(counts.as_deref().and_then(|v| v.last().copied()), Some(42));
        assert_eq!(widget.session(), SessionState::Clean);
        assert_eq!(widget.on_session_ended(), None);

        // The forced refresh is what later page loads see.
        assert_eq!(widget.cache().get(false).last(), Some(&42));
        Ok(())
    }

    #[test]
    fn test_collection_attached_later() -> Result<()> {
        let today = epoch_day(test_today());
        let (_dir, mut widget) = widget(SqliteActivityLog::detached(REVIEW_LOG), Settings::default())?;

        widget.on_activity_recorded();
        assert_eq!(widget.on_session_ended().map(|v| v.total()), Some(0));

        widget
            .cache_mut()
            .aggregator_mut()
            .log_mut()
            .attach(review_log_with(&[today * MS_PER_DAY, today * MS_PER_DAY + 1])?);
        widget.on_activity_recorded();
        assert_eq!(widget.on_session_ended().map(|v| v.total()), Some(2));
        Ok(())
    }

    #[test]
    fn test_settings_round_trip_through_editor() -> Result<()> {
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().returning(|_| Ok(vec![]));
        let (_dir, widget) = widget(log, Settings::default())?;

        let mut form = widget.open_settings();
        form.range_days = 90;
        form.goal_per_day = 10;
        widget.on_settings_saved(form.export(widget.cache().store().load()));

        let stored = widget.cache().store().load();
        assert_eq!(stored.range_days, 90);
        assert_eq!(stored.goal_per_day, 10);
        assert_eq!(widget.cache().get(false).len(), 90);
        Ok(())
    }

    #[test]
    fn test_install_registers_and_mirrors() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let mut manager = MockAddonManager::new();
        manager
            .expect_addon_from_module()
            .returning(|_| Some("1234".into()));
        manager
            .expect_set_config_defaults()
            .times(1)
            .returning(|_, _| Ok(()));
        manager
            .expect_set_config_action()
            .times(1)
            .returning(|_| Ok(()));
        manager.expect_get_config().returning(|_| Ok(None));
        manager
            .expect_write_config()
            .withf(|id, config| id == "1234" && config["enabled"] == false)
            .times(1)
            .returning(|_, _| Ok(()));

        let widget = install(
            Arc::new(manager),
            &["review_bars"],
            dir.path(),
            SqliteActivityLog::detached(REVIEW_LOG),
        );
        widget.on_settings_saved(Settings {
            enabled: false,
            ..Settings::default()
        });
        assert!(!widget.cache().store().load().enabled);
        Ok(())
    }

    #[test]
    fn test_signal_module_drives_widget() -> Result<()> {
        let today = epoch_day(test_today());
        let mut log = MockActivityLog::new();
        log.expect_count_by_day().times(1).returning(move |_| {
            Ok(vec![DayCount {
                epoch_day: today,
                count: 3,
            }])
        });
        let (_dir, widget) = widget(log, Settings::default())?;
        let (sender, module) = signal_channel(widget);

        let fragment = single_thread_runtime()?.block_on(async move {
            let (reply, fragment) = oneshot::channel();
            let host = async move {
                sender.send(HostSignal::ActivityRecorded).await?;
                sender.send(HostSignal::ActivityRecorded).await?;
                sender.send(HostSignal::SessionEnded).await?;
                sender.send(HostSignal::SessionEnded).await?;
                sender
                    .send(HostSignal::ContentRequested {
                        page: Some(HostPage::DeckBrowser),
                        reply,
                    })
                    .await?;
                anyhow::Ok(fragment.await?)
            };
            let (fragment, widget) = tokio::join!(host, module.run());
            assert_eq!(widget.session(), SessionState::Clean);
            fragment
        })?;

        let fragment = fragment.map(|v| v.to_string()).unwrap_or_default();
        assert!(fragment.contains("Last 30 days: 3 reviews"));
        Ok(())
    }
}
