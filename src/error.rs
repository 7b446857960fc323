use thiserror::Error;

/// Errors produced while authoring, loading or playing guides
#[derive(Debug, Error)]
pub enum GuideError {
    /// An editor operation addressed a step that does not exist
    #[error("Step index {index} is out of range (guide has {len} steps)")]
    StepIndexOutOfRange { index: usize, len: usize },

    /// Imported or loaded data does not have the shape of a guide document
    #[error("Malformed guide document: {0}")]
    MalformedGuide(String),

    /// A guide could not be fetched from its store
    #[error("Failed to load guide '{name}': {reason}")]
    LoadFailed { name: String, reason: String },

    /// A stored selector matched nothing in the live document
    #[error("Selector '{0}' did not match any element")]
    SelectorResolution(String),

    /// A node handle does not name an element of the document
    #[error("Unknown node handle {0}")]
    UnknownNode(usize),

    /// The selector uses syntax the query engine does not understand
    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// A field path or field value passed to an editor operation is invalid
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuideError {
    /// Whether the error should be shown to the guide author as an explicit message.
    ///
    /// Everything else is contained by the component that hit it and only logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            GuideError::StepIndexOutOfRange { .. }
                | GuideError::MalformedGuide(_)
                | GuideError::InvalidField { .. }
        )
    }
}

/// Result type alias for guide operations
pub type Result<T> = std::result::Result<T, GuideError>;
