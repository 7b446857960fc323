use crate::error::{GuideError, Result};
use crate::picker::{DEFAULT_OVERLAY_CLASS, DEFAULT_PICKING_MARKER_CLASS, PickerOptions};
use crate::selector::{DEFAULT_MARKER_ATTRIBUTE, DEFAULT_RESERVED_PREFIXES, SelectorSynthesizer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_GUIDES_DIR: &str = "GUIDE_KIT_GUIDES_DIR";
pub const ENV_PREFERENCES: &str = "GUIDE_KIT_PREFERENCES";
pub const ENV_MARKER_ATTRIBUTE: &str = "GUIDE_KIT_MARKER_ATTRIBUTE";
pub const ENV_RESOLUTION_POLICY: &str = "GUIDE_KIT_RESOLUTION_POLICY";

/// What the player does with a step whose selector matches nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Log a warning and move on to the next step that resolves
    #[default]
    Skip,
    /// Show the popover anyway, without a highlight
    ShowUnanchored,
}

impl FromStr for ResolutionPolicy {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ResolutionPolicy::Skip),
            "show-unanchored" | "show_unanchored" => Ok(ResolutionPolicy::ShowUnanchored),
            other => Err(GuideError::InvalidField {
                field: "resolution_policy".to_string(),
                reason: format!("'{}' is not skip or show-unanchored", other),
            }),
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::Skip => f.write_str("skip"),
            ResolutionPolicy::ShowUnanchored => f.write_str("show-unanchored"),
        }
    }
}

/// Runtime settings shared by the picker, the player and the stores
#[derive(Debug, Clone)]
pub struct Config {
    pub guides_dir: PathBuf,

    pub preferences_path: PathBuf,

    /// Attribute authors put on stable guide anchors
    pub marker_attribute: String,

    /// Class prefixes owned by the picker and highlight UI
    pub reserved_class_prefixes: Vec<String>,

    pub overlay_class: String,

    pub picking_marker_class: String,

    pub resolution_policy: ResolutionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guides_dir: PathBuf::from("guides"),
            preferences_path: PathBuf::from("guide-preferences.json"),
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            reserved_class_prefixes: DEFAULT_RESERVED_PREFIXES.iter().map(|p| p.to_string()).collect(),
            overlay_class: DEFAULT_OVERLAY_CLASS.to_string(),
            picking_marker_class: DEFAULT_PICKING_MARKER_CLASS.to_string(),
            resolution_policy: ResolutionPolicy::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `GUIDE_KIT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; empty values are ignored
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(ENV_GUIDES_DIR) {
            config.guides_dir = PathBuf::from(dir);
        }
        if let Some(path) = get(ENV_PREFERENCES) {
            config.preferences_path = PathBuf::from(path);
        }
        if let Some(attribute) = get(ENV_MARKER_ATTRIBUTE) {
            config.marker_attribute = attribute;
        }
        if let Some(policy) = get(ENV_RESOLUTION_POLICY) {
            config.resolution_policy = policy.parse()?;
        }

        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Builder method: set the guides directory
    pub fn guides_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.guides_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder method: set the preferences file
    pub fn preferences_path(mut self, path: impl AsRef<Path>) -> Self {
        self.preferences_path = path.as_ref().to_path_buf();
        self
    }

    /// Builder method: set the marker attribute
    pub fn marker_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.marker_attribute = attribute.into();
        self
    }

    /// Builder method: replace the reserved class prefixes
    pub fn reserved_class_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_class_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: set the picker overlay class
    pub fn overlay_class(mut self, class_name: impl Into<String>) -> Self {
        self.overlay_class = class_name.into();
        self
    }

    /// Builder method: set the body marker class used while picking
    pub fn picking_marker_class(mut self, class_name: impl Into<String>) -> Self {
        self.picking_marker_class = class_name.into();
        self
    }

    /// Builder method: set the unresolved-step policy
    pub fn resolution_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.resolution_policy = policy;
        self
    }

    pub fn synthesizer(&self) -> SelectorSynthesizer {
        SelectorSynthesizer::new()
            .marker_attribute(self.marker_attribute.clone())
            .reserved_prefixes(self.reserved_class_prefixes.iter().cloned())
    }

    pub fn picker_options(&self) -> PickerOptions {
        PickerOptions {
            overlay_class: self.overlay_class.clone(),
            picking_marker_class: self.picking_marker_class.clone(),
            synthesizer: self.synthesizer(),
        }
    }
}
