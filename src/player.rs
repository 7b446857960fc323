//! Guide playback
//!
//! [`GuidePlayer`] walks a guide's steps against a [`LiveDocument`], handing a
//! [`StepView`] for each shown step to a [`TourRenderer`]. A player runs at most one tour:
//! starting another guide destroys the running one first.

use crate::config::ResolutionPolicy;
use crate::dom::{BoundingBox, LiveDocument};
use crate::guide::{Alignment, GuideDocument, GuideStep, Placement};
use crate::input::Key;
use crate::selector::Selector;

pub const NEXT_LABEL: &str = "Next";
pub const DONE_LABEL: &str = "Done";
pub const PREVIOUS_LABEL: &str = "Previous";

/// Draws and removes the highlight + popover for the active step
pub trait TourRenderer {
    fn show_step(&mut self, view: &StepView);

    /// Remove everything previously shown
    fn clear(&mut self);
}

/// Everything needed to draw one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub guide_name: String,
    /// 0-based position in the guide
    pub index: usize,
    pub total: usize,
    /// "{n} of {total}"
    pub progress_text: String,
    pub selector: Selector,
    pub title: String,
    pub description: String,
    pub placement: Placement,
    pub alignment: Alignment,
    /// `None` when the step is shown without a highlighted target
    pub bounds: Option<BoundingBox>,
    pub forward_label: &'static str,
    pub show_previous: bool,
}

/// Why a tour stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Advanced past the last step
    Completed,
    /// Closed by the user or the host
    Closed,
    /// Torn down because another guide started
    Replaced,
    /// No step of the guide could be shown
    NoTargets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Running,
    Destroyed(EndReason),
}

impl PlayerStatus {
    pub fn is_running(self) -> bool {
        self == PlayerStatus::Running
    }
}

/// A step that could not be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub index: usize,
    pub selector: Selector,
    pub reason: String,
}

/// Result of [`GuidePlayer::start`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    /// Whether a step is now on screen
    pub started: bool,
    /// Index of the first shown step
    pub first_index: Option<usize>,
    pub skipped: Vec<SkippedStep>,
}

/// The running tour: a private copy of the guide plus the active position
#[derive(Debug, Clone)]
struct ActiveTour {
    guide_name: String,
    steps: Vec<GuideStep>,
    active_index: usize,
}

enum Resolved {
    Anchored(BoundingBox),
    Unanchored,
    Unavailable(String),
}

pub struct GuidePlayer<R: TourRenderer> {
    renderer: R,
    policy: ResolutionPolicy,
    tour: Option<ActiveTour>,
    status: PlayerStatus,
}

impl<R: TourRenderer> GuidePlayer<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_policy(renderer, ResolutionPolicy::default())
    }

    pub fn with_policy(renderer: R, policy: ResolutionPolicy) -> Self {
        Self {
            renderer,
            policy,
            tour: None,
            status: PlayerStatus::Idle,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.tour.is_some()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.tour.as_ref().map(|t| t.active_index)
    }

    pub fn active_step(&self) -> Option<&GuideStep> {
        self.tour.as_ref().and_then(|t| t.steps.get(t.active_index))
    }

    pub fn guide_name(&self) -> Option<&str> {
        self.tour.as_ref().map(|t| t.guide_name.as_str())
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Start playing `guide`, tearing down any running tour first
    ///
    /// The player keeps its own copy of the steps, so later edits to `guide` do not
    /// affect the running tour.
    pub fn start<D: LiveDocument + ?Sized>(&mut self, guide: &GuideDocument, doc: &D) -> StartReport {
        if self.tour.is_some() {
            log::debug!("Replacing running tour before starting '{}'", guide.name);
            self.end(EndReason::Replaced);
        }

        let mut report = StartReport::default();

        if guide.is_empty() {
            log::debug!("Guide '{}' has no steps; nothing to play", guide.name);
            self.status = PlayerStatus::Destroyed(EndReason::Completed);
            return report;
        }

        let mut tour = ActiveTour {
            guide_name: guide.name.clone(),
            steps: guide.steps.clone(),
            active_index: 0,
        };

        for index in 0..tour.steps.len() {
            match self.resolve(&tour.steps[index], doc) {
                Resolved::Unavailable(reason) => {
                    report.skipped.push(SkippedStep {
                        index,
                        selector: tour.steps[index].element.clone(),
                        reason,
                    });
                }
                resolved => {
                    tour.active_index = index;
                    self.renderer.show_step(&view_for(&tour, bounds_of(&resolved)));
                    self.tour = Some(tour);
                    self.status = PlayerStatus::Running;
                    report.started = true;
                    report.first_index = Some(index);
                    log::debug!("Started guide '{}' at step {}", guide.name, index + 1);
                    return report;
                }
            }
        }

        log::warn!("Guide '{}' has no step whose target is on the page", guide.name);
        self.status = PlayerStatus::Destroyed(EndReason::NoTargets);
        report
    }

    /// Move to the next step; on the last step this ends the tour as completed
    pub fn advance<D: LiveDocument + ?Sized>(&mut self, doc: &D) -> PlayerStatus {
        let Some(tour) = self.tour.as_ref() else {
            return self.status;
        };
        let from = tour.active_index + 1;
        let candidates: Vec<usize> = (from..tour.steps.len()).collect();

        match self.first_showable(candidates, doc) {
            Some((index, bounds)) => self.show(index, bounds),
            None => self.end(EndReason::Completed),
        }
        self.status
    }

    /// Move back to the previous showable step; no-op on the first one
    pub fn previous<D: LiveDocument + ?Sized>(&mut self, doc: &D) -> PlayerStatus {
        let Some(tour) = self.tour.as_ref() else {
            return self.status;
        };
        let candidates: Vec<usize> = (0..tour.active_index).rev().collect();

        if let Some((index, bounds)) = self.first_showable(candidates, doc) {
            self.show(index, bounds);
        }
        self.status
    }

    /// Stop the tour and remove everything it drew
    ///
    /// Calling this on a destroyed player does nothing.
    pub fn destroy(&mut self) {
        match self.status {
            PlayerStatus::Destroyed(_) => {}
            PlayerStatus::Idle => self.status = PlayerStatus::Destroyed(EndReason::Closed),
            PlayerStatus::Running => self.end(EndReason::Closed),
        }
    }

    /// Keyboard routing while a tour runs
    pub fn handle_key<D: LiveDocument + ?Sized>(&mut self, doc: &D, key: &Key) -> PlayerStatus {
        if self.tour.is_none() {
            return self.status;
        }
        match key {
            Key::Escape => self.destroy(),
            Key::ArrowRight => {
                self.advance(doc);
            }
            Key::ArrowLeft => {
                self.previous(doc);
            }
            _ => {}
        }
        self.status
    }

    fn resolve<D: LiveDocument + ?Sized>(&self, step: &GuideStep, doc: &D) -> Resolved {
        match step.selector().resolve(doc) {
            Ok(handle) => match doc.bounding_box_of(handle) {
                Some(bounds) => Resolved::Anchored(bounds),
                None => Resolved::Unanchored,
            },
            Err(e) => {
                log::warn!("Step target '{}' is not on the page: {}", step.selector(), e);
                match self.policy {
                    ResolutionPolicy::Skip => Resolved::Unavailable(e.to_string()),
                    ResolutionPolicy::ShowUnanchored => Resolved::Unanchored,
                }
            }
        }
    }

    fn first_showable<D, I>(&self, candidates: I, doc: &D) -> Option<(usize, Option<BoundingBox>)>
    where
        D: LiveDocument + ?Sized,
        I: IntoIterator<Item = usize>,
    {
        let tour = self.tour.as_ref()?;
        candidates.into_iter().find_map(|index| match self.resolve(&tour.steps[index], doc) {
            Resolved::Unavailable(_) => None,
            resolved => Some((index, bounds_of(&resolved))),
        })
    }

    fn show(&mut self, index: usize, bounds: Option<BoundingBox>) {
        if let Some(tour) = self.tour.as_mut() {
            tour.active_index = index;
            log::debug!("Guide '{}' at step {}", tour.guide_name, index + 1);
            self.renderer.show_step(&view_for(tour, bounds));
        }
    }

    fn end(&mut self, reason: EndReason) {
        if let Some(tour) = self.tour.take() {
            log::debug!("Guide '{}' ended: {:?}", tour.guide_name, reason);
            self.renderer.clear();
        }
        self.status = PlayerStatus::Destroyed(reason);
    }
}

fn bounds_of(resolved: &Resolved) -> Option<BoundingBox> {
    match resolved {
        Resolved::Anchored(bounds) => Some(*bounds),
        _ => None,
    }
}

fn view_for(tour: &ActiveTour, bounds: Option<BoundingBox>) -> StepView {
    let index = tour.active_index;
    let total = tour.steps.len();
    let step = &tour.steps[index];

    StepView {
        guide_name: tour.guide_name.clone(),
        index,
        total,
        progress_text: format!("{} of {}", index + 1, total),
        selector: step.element.clone(),
        title: step.title().to_string(),
        description: step.body().to_string(),
        placement: step.placement(),
        alignment: step.alignment(),
        bounds,
        forward_label: if index + 1 == total { DONE_LABEL } else { NEXT_LABEL },
        show_previous: index > 0,
    }
}
