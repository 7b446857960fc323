//! Editor operations on [`GuideDocument`]
//!
//! Every operation borrows the current document and returns a new one; the input is
//! never modified. Steps are identified only by position, so operations keep the
//! relative order of every step they do not touch.

use crate::error::{GuideError, Result};
use crate::guide::model::{Alignment, GuideDocument, GuideStep, Placement};
use crate::selector::Selector;
use std::str::FromStr;

/// Direction for [`GuideDocument::move_step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl FromStr for MoveDirection {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(GuideError::InvalidField {
                field: "direction".to_string(),
                reason: format!("'{}' is not up or down", other),
            }),
        }
    }
}

/// A single-field change to a step
#[derive(Debug, Clone, PartialEq)]
pub enum StepUpdate {
    Selector(Selector),
    Title(String),
    Description(String),
    Placement(Placement),
    Alignment(Alignment),
}

impl StepUpdate {
    /// Build an update from a field path as used by the host UI
    /// (`element`, `popover.title`, `popover.description`, `popover.side`, `popover.align`)
    pub fn parse(field_path: &str, value: &str) -> Result<Self> {
        match field_path {
            "element" => Ok(StepUpdate::Selector(Selector::new(value))),
            "popover.title" => Ok(StepUpdate::Title(value.to_string())),
            "popover.description" => Ok(StepUpdate::Description(value.to_string())),
            "popover.side" => Ok(StepUpdate::Placement(value.parse()?)),
            "popover.align" => Ok(StepUpdate::Alignment(value.parse()?)),
            other => Err(GuideError::InvalidField {
                field: other.to_string(),
                reason: "unknown step field".to_string(),
            }),
        }
    }

    fn apply(self, step: &mut GuideStep) {
        match self {
            StepUpdate::Selector(selector) => step.element = selector,
            StepUpdate::Title(title) => step.popover.title = title,
            StepUpdate::Description(description) => step.popover.description = description,
            StepUpdate::Placement(placement) => step.popover.side = Some(placement),
            StepUpdate::Alignment(alignment) => step.popover.align = Some(alignment),
        }
    }
}

/// A change to a top-level guide field
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataUpdate {
    Name(String),
    Description(String),
    Category(String),
    AutoStartByDefault(bool),
}

impl MetadataUpdate {
    /// Build an update from a wire field name (`name`, `description`, `category`, `autoStartDefault`)
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        match field {
            "name" => Ok(MetadataUpdate::Name(value.to_string())),
            "description" => Ok(MetadataUpdate::Description(value.to_string())),
            "category" => Ok(MetadataUpdate::Category(value.to_string())),
            "autoStartDefault" => value
                .trim()
                .parse::<bool>()
                .map(MetadataUpdate::AutoStartByDefault)
                .map_err(|e| GuideError::InvalidField {
                    field: field.to_string(),
                    reason: e.to_string(),
                }),
            other => Err(GuideError::InvalidField {
                field: other.to_string(),
                reason: "unknown guide field".to_string(),
            }),
        }
    }
}

impl GuideDocument {
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.steps.len() {
            Ok(())
        } else {
            Err(GuideError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            })
        }
    }

    /// Append a placeholder step; returns the new document and the index of the new step
    pub fn add_step(&self) -> (GuideDocument, usize) {
        let mut next = self.clone();
        next.steps.push(GuideStep::placeholder());
        let index = next.steps.len() - 1;
        (next, index)
    }

    /// Remove the step at `index`; later steps shift down by one
    pub fn remove_step(&self, index: usize) -> Result<GuideDocument> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.steps.remove(index);
        Ok(next)
    }

    /// Swap the step at `index` with its neighbour in `direction`
    ///
    /// Moves that would leave the step list return an unchanged copy.
    pub fn move_step(&self, index: usize, direction: MoveDirection) -> GuideDocument {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };

        let mut next = self.clone();
        match target {
            Some(target) if index < next.steps.len() && target < next.steps.len() => {
                next.steps.swap(index, target);
            }
            _ => log::debug!("Ignoring out-of-range move of step {} {:?}", index, direction),
        }
        next
    }

    /// Insert a copy of the step at `index` right after it
    pub fn duplicate_step(&self, index: usize) -> Result<GuideDocument> {
        let copy = self.step(index)?.clone();
        let mut next = self.clone();
        next.steps.insert(index + 1, copy);
        Ok(next)
    }

    /// Change one field of the step at `index`
    pub fn update_step_field(&self, index: usize, update: StepUpdate) -> Result<GuideDocument> {
        self.check_index(index)?;
        let mut next = self.clone();
        update.apply(&mut next.steps[index]);
        Ok(next)
    }

    /// Change one top-level field
    pub fn update_metadata(&self, update: MetadataUpdate) -> GuideDocument {
        let mut next = self.clone();
        match update {
            MetadataUpdate::Name(name) => next.name = name,
            MetadataUpdate::Description(description) => next.description = description,
            MetadataUpdate::Category(category) => next.category = category,
            MetadataUpdate::AutoStartByDefault(auto_start) => next.auto_start_by_default = auto_start,
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> GuideDocument {
        GuideDocument::new("tour")
            .with_step(GuideStep::new("#a", "A", "first"))
            .with_step(GuideStep::new("#b", "B", "second"))
            .with_step(GuideStep::new("#c", "C", "third"))
    }

    fn titles(doc: &GuideDocument) -> Vec<&str> {
        doc.steps.iter().map(|s| s.title()).collect()
    }

    #[test]
    fn test_add_step_appends_placeholder() {
        let doc = abc();
        let (next, index) = doc.add_step();

        assert_eq!(index, 3);
        assert_eq!(next.len(), 4);
        assert_eq!(next.steps[3], GuideStep::placeholder());
        assert_eq!(doc.len(), 3, "input must be untouched");
    }

    #[test]
    fn test_remove_step_shifts_later_steps() {
        let next = abc().remove_step(1).unwrap();
        assert_eq!(titles(&next), vec!["A", "C"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let err = abc().remove_step(5).unwrap_err();
        assert!(matches!(err, GuideError::StepIndexOutOfRange { index: 5, len: 3 }));
    }

    #[test]
    fn test_move_first_step_up_is_noop() {
        let doc = abc();
        assert_eq!(doc.move_step(0, MoveDirection::Up), doc);
        assert_eq!(doc.move_step(2, MoveDirection::Down), doc);
        assert_eq!(doc.move_step(9, MoveDirection::Up), doc);
    }

    #[test]
    fn test_move_swaps_neighbours() {
        let doc = abc();
        assert_eq!(titles(&doc.move_step(0, MoveDirection::Down)), vec!["B", "A", "C"]);
        assert_eq!(titles(&doc.move_step(2, MoveDirection::Up)), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_duplicate_inserts_after() {
        let next = abc().duplicate_step(0).unwrap();
        assert_eq!(titles(&next), vec!["A", "A", "B", "C"]);
        assert!(abc().duplicate_step(3).is_err());
    }

    #[test]
    fn test_update_step_field() {
        let doc = abc();
        let next = doc
            .update_step_field(1, StepUpdate::parse("popover.title", "Bee").unwrap())
            .unwrap()
            .update_step_field(1, StepUpdate::parse("popover.side", "left").unwrap())
            .unwrap()
            .update_step_field(1, StepUpdate::Selector(Selector::new("#bee")))
            .unwrap();

        assert_eq!(titles(&next), vec!["A", "Bee", "C"]);
        assert_eq!(next.steps[1].placement(), Placement::Left);
        assert_eq!(next.steps[1].selector().as_str(), "#bee");
        assert_eq!(doc.steps[1].title(), "B");

        assert!(matches!(
            doc.update_step_field(3, StepUpdate::Title("x".into())),
            Err(GuideError::StepIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_step_update_parse_rejects_unknown_fields() {
        assert!(StepUpdate::parse("popover.colour", "red").is_err());
        assert!(StepUpdate::parse("popover.align", "sideways").is_err());
    }

    #[test]
    fn test_update_metadata() {
        let next = abc()
            .update_metadata(MetadataUpdate::Category("billing".into()))
            .update_metadata(MetadataUpdate::parse("autoStartDefault", "true").unwrap());

        assert_eq!(next.category, "billing");
        assert!(next.auto_start_by_default);
        assert_eq!(titles(&next), vec!["A", "B", "C"]);
        assert!(MetadataUpdate::parse("autoStartDefault", "maybe").is_err());
    }

    #[test]
    fn test_move_direction_from_str() {
        assert_eq!("UP".parse::<MoveDirection>().unwrap(), MoveDirection::Up);
        assert!("left".parse::<MoveDirection>().is_err());
    }
}
