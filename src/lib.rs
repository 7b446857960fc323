//! # guide-kit
//!
//! A Rust library for guided product tours: pick an element, get a selector that keeps
//! finding it, author a sequence of highlighted steps, and play them back against the
//! live UI.
//!
//! ## Features
//!
//! - **Selector Synthesis**: Stable selectors from marker attributes, ids, unique classes or a short ancestor path
//! - **Element Picker**: Modal pick sessions with hover highlighting and guaranteed input release
//! - **Guide Authoring**: Pure editor operations plus an editor session that tracks the selected step
//! - **Guide Player**: One tour at a time, step by step, with keyboard routing and progress text
//! - **Persistence**: JSON guide files, a guide catalog, and per-user auto-start preferences
//!
//! The live UI is never touched directly. Everything reads it through the
//! [`LiveDocument`] capability, and draws through [`PickerHost`] and [`TourRenderer`], so
//! the same logic runs against a browser bridge or the in-memory [`DomTree`].
//!
//! ## Command Line
//!
//! ```bash
//! # Check a guide file
//! cargo run --bin guide-kit -- validate guides/invoice-creation.json
//!
//! # Dry-run a guide against a DOM snapshot
//! cargo run --bin guide-kit -- play --dom page.json guides/invoice-creation.json
//! ```
//!
//! ## Library Usage
//!
//! ### Synthesizing a selector
//!
//! ```rust
//! use guide_kit::{DomTree, ElementNode, LiveDocument, selector};
//!
//! # fn main() -> guide_kit::Result<()> {
//! let doc = DomTree::new(
//!     ElementNode::new("body").with_child(
//!         ElementNode::new("button").with_id("save").with_classes(&["hover-x", "primary"]),
//!     ),
//! );
//!
//! let button = doc.query_first("button")?.expect("button exists");
//! assert_eq!(selector::synthesize(&doc, button)?.as_str(), "#save");
//! # Ok(())
//! # }
//! ```
//!
//! ### Playing a guide
//!
//! ```rust
//! use guide_kit::{DomTree, ElementNode, GuideDocument, GuidePlayer, GuideStep, StepView, TourRenderer};
//!
//! struct Console;
//!
//! impl TourRenderer for Console {
//!     fn show_step(&mut self, view: &StepView) {
//!         println!("[{}] {}", view.progress_text, view.title);
//!     }
//!
//!     fn clear(&mut self) {}
//! }
//!
//! let doc = DomTree::new(ElementNode::new("body").with_child(ElementNode::new("h1").with_id("welcome")));
//! let guide = GuideDocument::new("Welcome").with_step(GuideStep::new("#welcome", "Hello", "Start here"));
//!
//! let mut player = GuidePlayer::new(Console);
//! assert!(player.start(&guide, &doc).started);
//! player.advance(&doc);
//! assert!(!player.is_active());
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Live document capability, element snapshots and the in-memory tree
//! - [`selector`]: Selector type and synthesis rules
//! - [`picker`]: Interactive element picking
//! - [`guide`]: Guide model, editing, storage, catalog and preferences
//! - [`player`]: Tour playback
//! - [`invoicing`]: Demo invoicing data the bundled guides describe
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod dom;
pub mod error;
pub mod guide;
pub mod input;
pub mod invoicing;
pub mod picker;
pub mod player;
pub mod selector;

pub use config::{Config, ResolutionPolicy};
pub use dom::{BoundingBox, DomTree, ElementNode, LiveDocument, NodeHandle};
pub use error::{GuideError, Result};
pub use guide::{
    Alignment, DirectoryGuideStore, GuideCatalog, GuideDocument, GuideEditor, GuidePreferences, GuideStep,
    GuideStore, MetadataUpdate, MoveDirection, Placement, PreferencesStore, StepUpdate,
};
pub use input::{InputEvent, Key};
pub use picker::{Highlight, PickerHost, PickerOptions, PickerOutcome, PickerSession};
pub use player::{EndReason, GuidePlayer, PlayerStatus, StartReport, StepView, TourRenderer};
pub use selector::{Selector, SelectorSynthesizer};
