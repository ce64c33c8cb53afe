use std::{
    fs::File,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{host::AddonManager, utils::dir::ensure_dir};

use super::settings::Settings;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// The host's own config facility. Used as a best-effort copy of the primary file, and as the
/// source of settings when the file can't be read.
pub struct SettingsMirror {
    manager: Arc<dyn AddonManager>,
    addon_id: String,
}

impl SettingsMirror {
    pub fn new(manager: Arc<dyn AddonManager>, addon_id: String) -> Self {
        Self { manager, addon_id }
    }

    fn read(&self) -> Result<Option<Value>> {
        self.manager.get_config(&self.addon_id)
    }

    fn write(&self, object: &Map<String, Value>) -> Result<()> {
        self.manager
            .write_config(&self.addon_id, &Value::Object(object.clone()))
    }
}

/// Flat key-value settings persisted as a single json object. The file is the primary store;
/// the optional mirror is written after it and never affects it. Every failure is logged and
/// swallowed, the caller's in-memory [Settings] stay authoritative.
pub struct ConfigStore {
    path: PathBuf,
    mirror: Option<SettingsMirror>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, mirror: None }
    }

    /// Store backed by `config.json` in the add-on directory.
    pub fn in_addon_dir(addon_dir: &Path) -> Self {
        Self::new(addon_dir.join(CONFIG_FILE_NAME))
    }

    pub fn with_mirror(mut self, mirror: SettingsMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted object without defaults applied. Empty when nothing usable is stored.
    pub fn load_persisted(&self) -> Map<String, Value> {
        match self.read_file() {
            Ok(Some(value)) => return as_object(value),
            Ok(None) => debug!("No settings file at {:?}", self.path),
            Err(e) => warn!("Failed to read settings from {:?}: {e:?}", self.path),
        }

        match self.mirror.as_ref().map(SettingsMirror::read) {
            Some(Ok(Some(value))) => as_object(value),
            Some(Err(e)) => {
                warn!("Failed to read settings from host: {e:?}");
                Map::new()
            }
            _ => Map::new(),
        }
    }

    /// Persisted settings merged onto the defaults, so every option is present.
    pub fn load(&self) -> Settings {
        Settings::merged(self.load_persisted())
    }

    /// Reads a single option through the merged view.
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.load().to_object().remove(key).unwrap_or(default)
    }

    /// Replaces the whole persisted object. Primary and mirror writes are independent attempts.
    pub fn save(&self, settings: &Settings) {
        let object = settings.to_object();

        if let Err(e) = self.write_file(&object) {
            warn!("Failed to write settings to {:?}: {e:?}", self.path);
        }

        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.write(&object) {
                warn!("Failed to mirror settings to host: {e:?}");
            }
        }
    }

    fn read_file(&self) -> Result<Option<Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {:?}", self.path))?;
        Ok(Some(value))
    }

    fn write_file(&self, object: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let serialized = serde_json::to_string_pretty(object)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        // Whole-object replace under an exclusive lock.
        FileExt::lock_exclusive(&file)?;
        let result = (|| -> Result<()> {
            file.set_len(0)?;
            file.write_all(serialized.as_bytes())?;
            file.flush()?;
            Ok(())
        })();
        FileExt::unlock(&file)?;
        result
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            warn!("Persisted settings are not an object: {other}");
            Map::new()
        }
    }
}
