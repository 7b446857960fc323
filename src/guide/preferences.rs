use crate::error::Result;
use crate::guide::model::GuideDocument;
use crate::guide::store::guide_id;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Per-user guide settings and progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidePreferences {
    /// Master switch for automatically started guides
    #[serde(default = "default_auto_start")]
    pub auto_start_enabled: bool,

    /// Ids of guides the user has already been shown, in the order they were seen
    #[serde(default)]
    pub completed: IndexSet<String>,
}

fn default_auto_start() -> bool {
    true
}

impl Default for GuidePreferences {
    fn default() -> Self {
        Self {
            auto_start_enabled: default_auto_start(),
            completed: IndexSet::new(),
        }
    }
}

impl GuidePreferences {
    /// A guide starts on its own only when auto-start is on, the guide asks for it and
    /// the user has not seen it yet
    pub fn should_auto_start(&self, guide: &GuideDocument) -> bool {
        self.auto_start_enabled && guide.auto_start_by_default && !self.is_completed(&guide.name)
    }

    pub fn is_completed(&self, guide_name: &str) -> bool {
        self.completed.contains(&guide_id(guide_name))
    }

    /// Returns false if the guide was already marked
    pub fn mark_completed(&mut self, guide_name: &str) -> bool {
        self.completed.insert(guide_id(guide_name))
    }

    /// Forget all progress so every guide is shown again
    pub fn reset_progress(&mut self) {
        self.completed.clear();
    }

    pub fn set_auto_start(&mut self, enabled: bool) {
        self.auto_start_enabled = enabled;
    }
}

/// JSON file holding [`GuidePreferences`]
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the preferences; a missing or unreadable file yields the defaults
    pub fn load(&self) -> GuidePreferences {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return GuidePreferences::default(),
            Err(e) => {
                log::warn!("Could not read preferences {}: {}", self.path.display(), e);
                return GuidePreferences::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed preferences {}: {}", self.path.display(), e);
            GuidePreferences::default()
        })
    }

    pub fn save(&self, preferences: &GuidePreferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(preferences)?)?;
        Ok(())
    }

    /// Load, apply `change`, and save
    pub fn update<F>(&self, change: F) -> Result<GuidePreferences>
    where
        F: FnOnce(&mut GuidePreferences),
    {
        let mut preferences = self.load();
        change(&mut preferences);
        self.save(&preferences)?;
        Ok(preferences)
    }
}
