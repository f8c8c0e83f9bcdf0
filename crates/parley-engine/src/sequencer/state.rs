use super::compose::Composition;
use super::reply_button::AffordanceScope;
use super::submit::SubmitPath;
use crate::locator::TargetLocator;
use crate::resolution::{AuthorMatch, Candidate, CandidateStrategy};
use parley_common::protocol::ElementHandle;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Per-run working state. Never shared between runs.
#[derive(Debug, Clone, Default)]
pub struct SequencerState {
    pub container: Option<ElementHandle>,
    pub input: Option<ElementHandle>,
    pub mention_already_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerPhase {
    Idle,
    ReplyOpened,
    TextInserted,
    ImagesAttached,
    Submitted,
    Done,
    Failed(String),
}

impl fmt::Display for SequencerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerPhase::Idle => f.write_str("idle"),
            SequencerPhase::ReplyOpened => f.write_str("reply_opened"),
            SequencerPhase::TextInserted => f.write_str("text_inserted"),
            SequencerPhase::ImagesAttached => f.write_str("images_attached"),
            SequencerPhase::Submitted => f.write_str("submitted"),
            SequencerPhase::Done => f.write_str("done"),
            SequencerPhase::Failed(reason) => write!(f, "failed({})", reason),
        }
    }
}

/// What a run did, step by step. Diagnostic only; callers of the job API
/// only ever see the `ReplyOutcome`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub locator: TargetLocator,
    pub strategy: Option<CandidateStrategy>,
    pub candidate_count: usize,
    pub container: Option<Candidate>,
    pub reply_scope: Option<AffordanceScope>,
    pub input: Option<ElementHandle>,
    pub mention_already_present: bool,
    pub author: Option<AuthorMatch>,
    pub composition: Option<Composition>,
    pub attached_to: Option<ElementHandle>,
    pub submit: Option<SubmitPath>,
    pub phases: Vec<SequencerPhase>,
}

impl RunReport {
    pub fn new(locator: TargetLocator) -> Self {
        Self {
            locator,
            strategy: None,
            candidate_count: 0,
            container: None,
            reply_scope: None,
            input: None,
            mention_already_present: false,
            author: None,
            composition: None,
            attached_to: None,
            submit: None,
            phases: vec![SequencerPhase::Idle],
        }
    }

    pub fn enter(&mut self, phase: SequencerPhase) {
        info!("Reply sequence: {}", phase);
        self.phases.push(phase);
    }

    pub fn phase(&self) -> &SequencerPhase {
        self.phases.last().unwrap_or(&SequencerPhase::Idle)
    }
}
