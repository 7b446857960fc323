//! Guide persistence
//!
//! Guides live as one JSON file per guide, named after the guide's id
//! (`Invoice Creation` -> `invoice-creation.json`). Loading never panics: callers that
//! only want to show a guide when one exists use [`load_or_none`].

use crate::error::{GuideError, Result};
use crate::guide::model::GuideDocument;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const GUIDE_EXTENSION: &str = "json";

/// Storage for guide documents keyed by guide id
pub trait GuideStore {
    fn load(&self, id: &str) -> Result<GuideDocument>;

    /// Persist `guide` under [`guide_id`] of its name; returns the id used
    fn save(&self, guide: &GuideDocument) -> Result<String>;

    /// Ids of all stored guides, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Returns whether a guide was removed
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Derive the storage id for a guide name: lowercase ASCII alphanumerics joined by `-`
pub fn guide_id(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(GuideError::InvalidField {
            field: "id".to_string(),
            reason: format!("'{}' is not a valid guide id", id),
        })
    }
}

/// Load a guide, turning every failure into `None` after logging it
pub fn load_or_none<S: GuideStore + ?Sized>(store: &S, id: &str) -> Option<GuideDocument> {
    match store.load(id) {
        Ok(guide) => Some(guide),
        Err(e) => {
            log::error!("Guide '{}' unavailable: {}", id, e);
            None
        }
    }
}

/// Parse a guide the user pasted or uploaded
pub fn import_guide(json: &str) -> Result<GuideDocument> {
    GuideDocument::from_json(json)
}

/// Serialize a guide for download or copy
pub fn export_guide(guide: &GuideDocument) -> Result<String> {
    guide.to_json()
}

/// [`GuideStore`] over a directory of `<id>.json` files
#[derive(Debug, Clone)]
pub struct DirectoryGuideStore {
    root: PathBuf,
}

impl DirectoryGuideStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join(format!("{}.{}", id, GUIDE_EXTENSION)))
    }

    fn parse_loaded(id: &str, contents: &str) -> Result<GuideDocument> {
        let guide = GuideDocument::from_json(contents)?;
        log::debug!("Loaded guide '{}' ({} steps)", id, guide.len());
        Ok(guide)
    }
}

fn load_failed(id: &str, error: std::io::Error) -> GuideError {
    let reason = if error.kind() == ErrorKind::NotFound {
        "not found".to_string()
    } else {
        error.to_string()
    };
    GuideError::LoadFailed {
        name: id.to_string(),
        reason,
    }
}

impl GuideStore for DirectoryGuideStore {
    fn load(&self, id: &str) -> Result<GuideDocument> {
        let path = self.path_for(id)?;
        let contents = fs::read_to_string(&path).map_err(|e| load_failed(id, e))?;
        Self::parse_loaded(id, &contents)
    }

    fn save(&self, guide: &GuideDocument) -> Result<String> {
        guide.validate()?;
        let id = guide_id(&guide.name);
        let path = self.path_for(&id)?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, guide.to_json()?)?;
        log::debug!("Saved guide '{}' to {}", guide.name, path.display());
        Ok(id)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(GUIDE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(feature = "async")]
pub use self::nonblocking::AsyncGuideStore;

#[cfg(feature = "async")]
mod nonblocking {
    use super::*;
    use async_trait::async_trait;

    /// One-shot asynchronous guide loading
    #[async_trait]
    pub trait AsyncGuideStore: Send + Sync {
        async fn load(&self, id: &str) -> Result<GuideDocument>;

        /// Resolves once, to the guide or to `None`; failures are logged, never retried
        async fn load_or_none(&self, id: &str) -> Option<GuideDocument> {
            match self.load(id).await {
                Ok(guide) => Some(guide),
                Err(e) => {
                    log::error!("Guide '{}' unavailable: {}", id, e);
                    None
                }
            }
        }
    }

    #[async_trait]
    impl AsyncGuideStore for DirectoryGuideStore {
        async fn load(&self, id: &str) -> Result<GuideDocument> {
            let path = self.path_for(id)?;
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| load_failed(id, e))?;
            Self::parse_loaded(id, &contents)
        }
    }
}
