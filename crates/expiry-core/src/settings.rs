//! Settings file management.
//!
//! Settings live in a flat INI file:
//!
//! ```ini
//! [Databases]
//! Lab Reagents=/home/me/reagents.db
//!
//! [Notifications]
//! scan_interval=10800
//! notify_days=14
//! ```
//!
//! [`SettingsStore`] re-reads the file on every call; nothing is cached, so
//! hand edits are picked up by the next scan. Loading never prompts: a
//! missing file simply has no tracked stores, and onboarding is left to the
//! caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{EscapePolicy, Ini, ParseOption};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Group mapping display names to store paths.
pub const DATABASES_SECTION: &str = "Databases";
/// Older files kept their stores under this group.
pub const LEGACY_DATABASES_SECTION: &str = "Settings";
/// Group holding the scan settings.
pub const NOTIFICATIONS_SECTION: &str = "Notifications";
/// Seconds between scans.
pub const SCAN_INTERVAL_KEY: &str = "scan_interval";
/// Days ahead that count as upcoming.
pub const NOTIFY_DAYS_KEY: &str = "notify_days";

/// Default scan interval (3 hours).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 3 * 60 * 60;
/// Longest accepted scan interval (30 days).
pub const MAX_SCAN_INTERVAL_SECS: u64 = 30 * 24 * 60 * 60;
/// Default notify window.
pub const DEFAULT_NOTIFY_DAYS: u32 = 14;

/// Default settings path following platform conventions.
///
/// - Linux: `~/.config/expiry-watch/settings.ini`
/// - macOS: `~/Library/Application Support/expiry-watch/settings.ini`
/// - Windows: `C:\Users\<user>\AppData\Roaming\expiry-watch\settings.ini`
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expiry-watch")
        .join("settings.ini")
}

/// A named reference to one product store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedStore {
    /// Name shown in notifications and menus. Unique among tracked stores.
    pub display_name: String,
    /// Path of the store file.
    pub location: PathBuf,
}

impl TrackedStore {
    /// Create a reference with an explicit name.
    pub fn new(display_name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            location: location.into(),
        }
    }

    /// Create a reference, falling back to the file name when no name (or
    /// only whitespace) is given.
    pub fn with_default_name(display_name: Option<&str>, location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(&location));
        Self {
            display_name,
            location,
        }
    }
}

/// File name of a store path, used when the user gives no display name.
pub fn default_display_name(location: &Path) -> String {
    location
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.display().to_string())
}

/// Scan timing and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSettings {
    /// Seconds between scan cycles.
    pub scan_interval_secs: u64,
    /// Days ahead of today that count as upcoming.
    pub notify_days: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            notify_days: DEFAULT_NOTIFY_DAYS,
        }
    }
}

impl ScanSettings {
    /// Interval between scans, kept within `1..=MAX_SCAN_INTERVAL_SECS`.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.clamp(1, MAX_SCAN_INTERVAL_SECS))
    }
}

/// Result of [`SettingsStore::add_tracked_store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was written.
    Added,
    /// An entry with the same name was overwritten after confirmation.
    Replaced,
    /// The user declined to overwrite; nothing was written.
    Declined,
}

/// Reader and writer for the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Settings backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings at [`default_settings_path`].
    pub fn open_default() -> Self {
        Self::new(default_settings_path())
    }

    /// The settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the settings file exists yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All `key=value` pairs of a group, in file order. A missing group or
    /// file yields an empty list.
    pub fn load(&self, section: &str) -> Result<Vec<(String, String)>> {
        let ini = self.read()?;
        Ok(ini
            .section(Some(section))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Set one key, creating the file and group if needed.
    pub fn write(&self, section: &str, key: &str, value: &str) -> Result<()> {
        let mut ini = self.read()?;
        ini.with_section(Some(section)).set(key, value);
        self.save(&mut ini)
    }

    /// Tracked stores in file order.
    pub fn tracked_stores(&self) -> Result<Vec<TrackedStore>> {
        let ini = self.read()?;
        let section = databases_section(&ini);
        Ok(ini
            .section(Some(section))
            .map(|props| {
                props
                    .iter()
                    .map(|(name, location)| TrackedStore::new(name, location))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Scan settings, falling back to defaults for missing or bad values.
    pub fn scan_settings(&self) -> Result<ScanSettings> {
        let ini = self.read()?;
        let defaults = ScanSettings::default();
        let props = ini.section(Some(NOTIFICATIONS_SECTION));
        let get = |key: &str| props.and_then(|p| p.get(key));

        Ok(ScanSettings {
            scan_interval_secs: parse_positive(
                SCAN_INTERVAL_KEY,
                get(SCAN_INTERVAL_KEY),
                defaults.scan_interval_secs,
                MAX_SCAN_INTERVAL_SECS,
            ),
            notify_days: parse_positive(
                NOTIFY_DAYS_KEY,
                get(NOTIFY_DAYS_KEY),
                defaults.notify_days,
                u32::MAX,
            ),
        })
    }

    /// Track a store.
    ///
    /// A location that is already tracked is rejected whatever the proposed
    /// name. A name that is already in use calls `confirm_overwrite` with the
    /// existing entry; declining leaves the file untouched.
    pub fn add_tracked_store<F>(&self, store: &TrackedStore, confirm_overwrite: F) -> Result<AddOutcome>
    where
        F: FnOnce(&TrackedStore) -> bool,
    {
        let existing = self.tracked_stores()?;

        if let Some(dup) = existing
            .iter()
            .find(|t| same_location(&t.location, &store.location))
        {
            warn!(
                "Refusing to track {} again (already tracked as \"{}\")",
                store.location.display(),
                dup.display_name
            );
            return Err(Error::DuplicateLocation {
                existing_name: dup.display_name.clone(),
            });
        }

        let outcome = match existing.iter().find(|t| t.display_name == store.display_name) {
            Some(current) if !confirm_overwrite(current) => {
                info!("Kept existing database \"{}\"", current.display_name);
                return Ok(AddOutcome::Declined);
            }
            Some(_) => AddOutcome::Replaced,
            None => AddOutcome::Added,
        };

        let mut ini = self.read()?;
        migrate_legacy_section(&mut ini);
        ini.with_section(Some(DATABASES_SECTION))
            .set(store.display_name.as_str(), store.location.to_string_lossy());
        self.save(&mut ini)?;

        info!(
            "Tracking \"{}\" at {}",
            store.display_name,
            store.location.display()
        );
        Ok(outcome)
    }

    /// Stop tracking a store. Returns the removed entry.
    pub fn remove_tracked_store(&self, display_name: &str) -> Result<TrackedStore> {
        let mut ini = self.read()?;
        migrate_legacy_section(&mut ini);
        let location = ini
            .delete_from(Some(DATABASES_SECTION), display_name)
            .ok_or_else(|| Error::UnknownStore(display_name.to_string()))?;
        self.save(&mut ini)?;

        info!("Stopped tracking \"{}\"", display_name);
        Ok(TrackedStore::new(display_name, location))
    }

    /// Set the scan interval in seconds.
    pub fn set_scan_interval(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(Error::InvalidSetting {
                key: SCAN_INTERVAL_KEY,
                reason: "must be greater than zero".to_string(),
            });
        }
        if secs > MAX_SCAN_INTERVAL_SECS {
            return Err(Error::InvalidSetting {
                key: SCAN_INTERVAL_KEY,
                reason: format!("must be at most {} seconds (30 days)", MAX_SCAN_INTERVAL_SECS),
            });
        }
        self.write(NOTIFICATIONS_SECTION, SCAN_INTERVAL_KEY, &secs.to_string())
    }

    /// Set the notify window in days.
    pub fn set_notify_days(&self, days: u32) -> Result<()> {
        if days == 0 {
            return Err(Error::InvalidSetting {
                key: NOTIFY_DAYS_KEY,
                reason: "must be greater than zero".to_string(),
            });
        }
        self.write(NOTIFICATIONS_SECTION, NOTIFY_DAYS_KEY, &days.to_string())
    }

    fn read(&self) -> Result<Ini> {
        if !self.path.exists() {
            debug!("No settings file at {}", self.path.display());
            return Ok(Ini::new());
        }
        Ini::load_from_file_opt(&self.path, parse_options()).map_err(|e| Error::ConfigRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn save(&self, ini: &mut Ini) -> Result<()> {
        seed_defaults(ini);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
                path: self.path.clone(),
                source: e,
            })?;
        }

        ini.write_to_file_policy(&self.path, EscapePolicy::Nothing)
            .map_err(|e| Error::ConfigWrite {
                path: self.path.clone(),
                source: e,
            })?;
        debug!("Wrote settings to {}", self.path.display());
        Ok(())
    }
}

/// Paths are raw text (Windows backslashes included), so escapes and quotes
/// are not interpreted.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

fn databases_section(ini: &Ini) -> &'static str {
    if ini.section(Some(DATABASES_SECTION)).is_none()
        && ini.section(Some(LEGACY_DATABASES_SECTION)).is_some()
    {
        LEGACY_DATABASES_SECTION
    } else {
        DATABASES_SECTION
    }
}

fn migrate_legacy_section(ini: &mut Ini) {
    if databases_section(ini) != LEGACY_DATABASES_SECTION {
        return;
    }
    if let Some(legacy) = ini.delete(Some(LEGACY_DATABASES_SECTION)) {
        info!("Moving tracked databases from [{}] to [{}]", LEGACY_DATABASES_SECTION, DATABASES_SECTION);
        let mut section = ini.with_section(Some(DATABASES_SECTION));
        for (name, location) in legacy.iter() {
            section.set(name, location);
        }
    }
}

fn seed_defaults(ini: &mut Ini) {
    let defaults = ScanSettings::default();
    let has = |ini: &Ini, key: &str| {
        ini.section(Some(NOTIFICATIONS_SECTION))
            .is_some_and(|p| p.contains_key(key))
    };
    if !has(ini, SCAN_INTERVAL_KEY) {
        ini.with_section(Some(NOTIFICATIONS_SECTION))
            .set(SCAN_INTERVAL_KEY, defaults.scan_interval_secs.to_string());
    }
    if !has(ini, NOTIFY_DAYS_KEY) {
        ini.with_section(Some(NOTIFICATIONS_SECTION))
            .set(NOTIFY_DAYS_KEY, defaults.notify_days.to_string());
    }
}

/// Parse `raw` as a value in `1..=max`, falling back to `default`.
fn parse_positive<T>(key: &str, raw: Option<&str>, default: T, max: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default + std::fmt::Display + Copy,
{
    let Some(raw) = raw else {
        debug!("{} not set, using default {}", key, default);
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() && value <= max => value,
        _ => {
            warn!("Ignoring invalid {} '{}', using default {}", key, raw, default);
            default
        }
    }
}

/// Whether two paths refer to the same store file.
fn same_location(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
