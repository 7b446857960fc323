use crate::error::{GuideError, Result};
use crate::selector::Selector;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side of the target element a popover is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Right,
    #[default]
    Bottom,
    Left,
}

/// Alignment of a popover along the chosen side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Right => "right",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
        }
    }
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::End => "end",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Placement::Top),
            "right" => Ok(Placement::Right),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            other => Err(GuideError::InvalidField {
                field: "popover.side".to_string(),
                reason: format!("'{}' is not one of top, right, bottom, left", other),
            }),
        }
    }
}

impl FromStr for Alignment {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Alignment::Start),
            "center" => Ok(Alignment::Center),
            "end" => Ok(Alignment::End),
            other => Err(GuideError::InvalidField {
                field: "popover.align".to_string(),
                reason: format!("'{}' is not one of start, center, end", other),
            }),
        }
    }
}

/// Popover content attached to a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Popover {
    pub title: String,

    pub description: String,

    /// Absent on the wire means [`Placement::Bottom`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Placement>,

    /// Absent on the wire means [`Alignment::Start`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Alignment>,
}

/// One highlight + explanation in a guide
///
/// Steps have no identity of their own; they are addressed by position in the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GuideStep {
    /// Selector of the element to highlight
    pub element: Selector,

    pub popover: Popover,
}

/// A named, ordered product tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GuideDocument {
    pub name: String,

    pub description: String,

    pub category: String,

    /// Whether the guide starts on its own the first time its page is visited
    #[serde(rename = "autoStartDefault")]
    pub auto_start_by_default: bool,

    pub steps: Vec<GuideStep>,
}

pub const PLACEHOLDER_SELECTOR: &str = "[data-guide-step=\"new-step\"]";
pub const PLACEHOLDER_TITLE: &str = "New Step";
pub const PLACEHOLDER_DESCRIPTION: &str = "Describe what to do in this step";

impl GuideStep {
    pub fn new(element: impl Into<Selector>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            popover: Popover {
                title: title.into(),
                description: description.into(),
                side: None,
                align: None,
            },
        }
    }

    /// The step appended by the editor's "add step" action
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_SELECTOR, PLACEHOLDER_TITLE, PLACEHOLDER_DESCRIPTION)
            .with_placement(Placement::Bottom)
            .with_alignment(Alignment::Start)
    }

    /// Builder method: set the popover side
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.popover.side = Some(placement);
        self
    }

    /// Builder method: set the popover alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.popover.align = Some(alignment);
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.element
    }

    pub fn title(&self) -> &str {
        &self.popover.title
    }

    pub fn body(&self) -> &str {
        &self.popover.description
    }

    pub fn placement(&self) -> Placement {
        self.popover.side.unwrap_or_default()
    }

    pub fn alignment(&self) -> Alignment {
        self.popover.align.unwrap_or_default()
    }
}

impl GuideDocument {
    /// A blank guide with no steps
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            auto_start_by_default: false,
            steps: Vec::new(),
        }
    }

    /// Builder method: set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method: set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder method: set the auto-start default
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start_by_default = auto_start;
        self
    }

    /// Builder method: append a step
    pub fn with_step(mut self, step: GuideStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Result<&GuideStep> {
        self.steps.get(index).ok_or(GuideError::StepIndexOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// Check constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GuideError::MalformedGuide("guide name is empty".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.element.as_str().trim().is_empty() {
                return Err(GuideError::MalformedGuide(format!(
                    "step {} has an empty element selector",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a guide from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: GuideDocument =
            serde_json::from_str(json).map_err(|e| GuideError::MalformedGuide(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse and validate a guide from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let doc: GuideDocument =
            serde_json::from_value(value).map_err(|e| GuideError::MalformedGuide(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// JSON Schema describing the guide file format
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(GuideDocument)
    }
}
