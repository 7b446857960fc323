//! Guide documents: the data model, editing, persistence and user progress

pub mod catalog;
pub mod edit;
pub mod editor;
pub mod model;
pub mod preferences;
pub mod store;

pub use catalog::GuideCatalog;
pub use edit::{MetadataUpdate, MoveDirection, StepUpdate};
pub use editor::GuideEditor;
pub use model::{Alignment, GuideDocument, GuideStep, Placement, Popover};
pub use preferences::{GuidePreferences, PreferencesStore};
pub use store::{DirectoryGuideStore, GuideStore, export_guide, guide_id, import_guide, load_or_none};

#[cfg(feature = "async")]
pub use store::AsyncGuideStore;
