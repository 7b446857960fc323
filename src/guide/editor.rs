use crate::error::{GuideError, Result};
use crate::guide::edit::{MetadataUpdate, MoveDirection, StepUpdate};
use crate::guide::model::GuideDocument;
use crate::picker::PickerOutcome;

/// An authoring session over a private draft of a guide
///
/// The editor keeps track of the selected step the same way the editing UI does: the
/// selection follows the step an operation produced or moved, and is cleared when a
/// step is removed.
#[derive(Debug, Clone)]
pub struct GuideEditor {
    original: GuideDocument,
    draft: GuideDocument,
    selected: Option<usize>,
    awaiting_pick: Option<usize>,
}

impl GuideEditor {
    pub fn new(guide: GuideDocument) -> Self {
        Self {
            original: guide.clone(),
            draft: guide,
            selected: None,
            awaiting_pick: None,
        }
    }

    pub fn draft(&self) -> &GuideDocument {
        &self.draft
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the draft differs from the guide the session started with
    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn is_picking(&self) -> bool {
        self.awaiting_pick.is_some()
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.draft.step(index)?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn add_step(&mut self) -> usize {
        let (next, index) = self.draft.add_step();
        self.draft = next;
        self.selected = Some(index);
        index
    }

    pub fn remove_step(&mut self, index: usize) -> Result<()> {
        self.draft = self.draft.remove_step(index)?;
        self.selected = None;
        self.awaiting_pick = None;
        Ok(())
    }

    /// Swap a step with its neighbour; out-of-range moves change nothing
    ///
    /// A pending pick follows the step it was started for.
    pub fn move_step(&mut self, index: usize, direction: MoveDirection) {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        let Some(target) = target.filter(|&t| index < self.draft.len() && t < self.draft.len()) else {
            return;
        };

        self.draft = self.draft.move_step(index, direction);
        self.selected = Some(target);
        self.awaiting_pick = self.awaiting_pick.map(|pending| match pending {
            p if p == index => target,
            p if p == target => index,
            p => p,
        });
    }

    pub fn duplicate_step(&mut self, index: usize) -> Result<()> {
        self.draft = self.draft.duplicate_step(index)?;
        self.selected = Some(index + 1);
        self.awaiting_pick = self.awaiting_pick.map(|p| if p > index { p + 1 } else { p });
        Ok(())
    }

    pub fn update_step(&mut self, index: usize, update: StepUpdate) -> Result<()> {
        self.draft = self.draft.update_step_field(index, update)?;
        Ok(())
    }

    pub fn update_metadata(&mut self, update: MetadataUpdate) {
        self.draft = self.draft.update_metadata(update);
    }

    /// Select `index` and wait for a picked selector for it
    pub fn begin_pick(&mut self, index: usize) -> Result<()> {
        self.select(index)?;
        self.awaiting_pick = Some(index);
        Ok(())
    }

    /// Apply a picker outcome to the step waiting for it
    ///
    /// Returns whether the draft changed. A cancelled pick leaves the draft untouched.
    pub fn finish_pick(&mut self, outcome: PickerOutcome) -> Result<bool> {
        let Some(index) = self.awaiting_pick.take() else {
            log::debug!("Ignoring picker outcome with no step waiting for it");
            return Ok(false);
        };

        match outcome {
            PickerOutcome::Selected(selector) => {
                self.update_step(index, StepUpdate::Selector(selector))?;
                Ok(true)
            }
            PickerOutcome::Cancelled => Ok(false),
        }
    }

    /// Validated copy of the draft, ready to persist
    pub fn save(&mut self) -> Result<GuideDocument> {
        self.draft.validate()?;
        self.original = self.draft.clone();
        Ok(self.draft.clone())
    }

    /// Drop the edits and return the guide as it was when the session started
    pub fn discard(self) -> GuideDocument {
        self.original
    }

    /// Footer line such as "3 steps in this guide"
    pub fn summary(&self) -> String {
        let count = self.draft.len();
        format!("{} step{} in this guide", count, if count == 1 { "" } else { "s" })
    }

    /// Editor-facing message for an error, if it is one the user should see
    pub fn user_message(error: &GuideError) -> Option<String> {
        error.is_user_facing().then(|| error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::model::{GuideStep, PLACEHOLDER_TITLE};
    use crate::selector::Selector;

    fn editor() -> GuideEditor {
        GuideEditor::new(
            GuideDocument::new("tour")
                .with_step(GuideStep::new("#a", "A", ""))
                .with_step(GuideStep::new("#b", "B", ""))
                .with_step(GuideStep::new("#c", "C", "")),
        )
    }

    #[test]
    fn test_selection_follows_operations() {
        let mut editor = editor();

        assert_eq!(editor.add_step(), 3);
        assert_eq!(editor.selected(), Some(3));
        assert_eq!(editor.draft().steps[3].title(), PLACEHOLDER_TITLE);

        editor.move_step(3, MoveDirection::Up);
        assert_eq!(editor.selected(), Some(2));

        editor.duplicate_step(0).unwrap();
        assert_eq!(editor.selected(), Some(1));

        editor.remove_step(1).unwrap();
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.draft().len(), 4);
    }

    #[test]
    fn test_noop_move_keeps_selection() {
        let mut editor = editor();
        editor.select(0).unwrap();
        editor.move_step(0, MoveDirection::Up);
        assert_eq!(editor.selected(), Some(0));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_move_between_identical_steps_selects_target() {
        let mut editor = editor();
        editor.duplicate_step(0).unwrap();
        editor.select(1).unwrap();

        editor.move_step(1, MoveDirection::Up);
        assert_eq!(editor.selected(), Some(0));

        editor.move_step(0, MoveDirection::Down);
        assert_eq!(editor.selected(), Some(1));
    }

    #[test]
    fn test_pick_follows_moved_step() {
        let mut editor = editor();
        editor.begin_pick(1).unwrap();
        editor.move_step(1, MoveDirection::Up);

        assert!(editor.finish_pick(PickerOutcome::Selected(Selector::new("#picked"))).unwrap());
        let steps = &editor.draft().steps;
        assert_eq!(steps[0].title(), "B");
        assert_eq!(steps[0].selector().as_str(), "#picked");
        assert_eq!(steps[1].title(), "A");
        assert_eq!(steps[1].selector().as_str(), "#a");
    }

    #[test]
    fn test_pick_survives_neighbour_moves_and_duplicates() {
        let mut editor = editor();
        editor.begin_pick(2).unwrap();

        editor.duplicate_step(0).unwrap();
        editor.move_step(1, MoveDirection::Down);
        editor.move_step(3, MoveDirection::Up);
        editor.add_step();

        assert!(editor.finish_pick(PickerOutcome::Selected(Selector::new("#picked"))).unwrap());
        let steps: Vec<(&str, &str)> = editor
            .draft()
            .steps
            .iter()
            .map(|s| (s.title(), s.selector().as_str()))
            .collect();
        assert_eq!(steps[2], ("C", "#picked"));
        assert_eq!(steps.iter().filter(|(_, sel)| *sel == "#picked").count(), 1);
    }

    #[test]
    fn test_pick_writes_selector() {
        let mut editor = editor();
        editor.begin_pick(1).unwrap();
        assert!(editor.is_picking());

        let changed = editor
            .finish_pick(PickerOutcome::Selected(Selector::new("[data-guide-step=\"welcome\"]")))
            .unwrap();
        assert!(changed);
        assert!(!editor.is_picking());
        assert_eq!(editor.draft().steps[1].selector().as_str(), "[data-guide-step=\"welcome\"]");
        assert!(editor.is_dirty());
    }

    #[test]
    fn test_cancelled_pick_leaves_draft() {
        let mut editor = editor();
        editor.begin_pick(2).unwrap();
        assert!(!editor.finish_pick(PickerOutcome::Cancelled).unwrap());
        assert!(!editor.is_dirty());

        assert!(!editor.finish_pick(PickerOutcome::Selected(Selector::new("#x"))).unwrap());
    }

    #[test]
    fn test_begin_pick_out_of_range() {
        let mut editor = editor();
        assert!(matches!(
            editor.begin_pick(7),
            Err(GuideError::StepIndexOutOfRange { index: 7, len: 3 })
        ));
        assert!(!editor.is_picking());
    }

    #[test]
    fn test_save_validates() {
        let mut editor = editor();
        editor.update_metadata(MetadataUpdate::Name("  ".into()));
        let err = editor.save().unwrap_err();
        assert!(GuideEditor::user_message(&err).is_some());

        editor.update_metadata(MetadataUpdate::Name("Renamed".into()));
        let saved = editor.save().unwrap();
        assert_eq!(saved.name, "Renamed");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_discard_returns_original() {
        let mut editor = editor();
        editor.remove_step(0).unwrap();
        assert_eq!(editor.discard().len(), 3);
    }

    #[test]
    fn test_summary() {
        let mut editor = GuideEditor::new(GuideDocument::new("x"));
        assert_eq!(editor.summary(), "0 steps in this guide");
        editor.add_step();
        assert_eq!(editor.summary(), "1 step in this guide");
        assert_eq!(self::editor().summary(), "3 steps in this guide");
    }
}
