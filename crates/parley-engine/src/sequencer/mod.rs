//! The reply sequence.
//!
//! A strict linear pipeline: settle, resolve the container, then run the
//! enabled steps in order (open reply box, insert text, attach images,
//! submit). Waits between steps give the host page time to react before the
//! next lookup, and every lookup re-queries the page.
//!
//! Only a missing comment input is terminal. Missing affordances are logged
//! and the run carries on, because confirmation on a third-party UI is best
//! effort. The sequence is never retried as a whole: a retry could post the
//! reply twice.

pub mod compose;
pub mod input;
pub mod reply_button;
pub mod state;
pub mod submit;
pub mod upload;

pub use compose::{Composition, InsertMode, compose};
pub use reply_button::AffordanceScope;
pub use state::{RunReport, SequencerPhase, SequencerState};
pub use submit::SubmitPath;

use crate::config::ParleyConfig;
use crate::error::SequencerError;
use crate::locator::TargetLocator;
use crate::page::Page;
use crate::resolution::resolve_container;
use parley_common::protocol::{ReplyJob, ReplyOutcome};
use std::time::Duration;
use tracing::{info, warn};

/// Suspend for `duration`; zero returns immediately.
pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

pub struct ReplySequencer {
    config: ParleyConfig,
}

impl Default for ReplySequencer {
    fn default() -> Self {
        Self::new(ParleyConfig::default())
    }
}

impl ReplySequencer {
    pub fn new(config: ParleyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    /// Run a job to its terminal outcome. Errors never escape.
    pub async fn run<P: Page + ?Sized>(&self, page: &mut P, job: &ReplyJob) -> ReplyOutcome {
        self.run_detailed(page, job).await.0
    }

    /// Run a job and also return what each step did.
    pub async fn run_detailed<P: Page + ?Sized>(
        &self,
        page: &mut P,
        job: &ReplyJob,
    ) -> (ReplyOutcome, RunReport) {
        let mut report = RunReport::new(TargetLocator::default());
        match self.execute(page, job, &mut report).await {
            Ok(()) => {
                report.enter(SequencerPhase::Done);
                (ReplyOutcome::ok(), report)
            }
            Err(e) => {
                warn!("Reply job failed: {}", e);
                let message = e.to_string();
                report.enter(SequencerPhase::Failed(message.clone()));
                (ReplyOutcome::failed(message), report)
            }
        }
    }

    async fn execute<P: Page + ?Sized>(
        &self,
        page: &mut P,
        job: &ReplyJob,
        report: &mut RunReport,
    ) -> Result<(), SequencerError> {
        let timings = &self.config.timings;
        let search = &self.config.search;
        let steps = job.steps;

        pause(timings.settle()).await;

        let url = page.current_url().await?;
        report.locator = TargetLocator::from_url(&url);
        info!(
            "Reply job for {:?} (nested: {}) on {}",
            report.locator.resolved_id, report.locator.is_nested_target, url
        );

        let resolution = resolve_container(&*page, &report.locator).await?;
        let mut state = SequencerState {
            container: resolution.selected.as_ref().map(|c| c.container),
            ..SequencerState::default()
        };
        report.strategy = resolution.strategy;
        report.candidate_count = resolution.candidate_count;
        report.container = resolution.selected;

        if steps.click_reply {
            report.reply_scope =
                reply_button::open_reply_box(page, state.container, search.reply_window_px)
                    .await?;
            if report.reply_scope.is_some() {
                pause(timings.post_click()).await;
                report.enter(SequencerPhase::ReplyOpened);
            }
        }

        if steps.needs_input() {
            state.input =
                input::locate_input(&*page, state.container, search.input_ancestor_levels)
                    .await?;
            report.input = state.input;
            if state.input.is_none() {
                return Err(SequencerError::InputNotFound);
            }
        }

        if steps.input_text
            && let Some(input_el) = state.input
        {
            let inserted = input::insert_message(
                page,
                input_el,
                state.container,
                &job.message,
                timings,
            )
            .await?;
            state.mention_already_present = inserted.mention_already_present;
            report.mention_already_present = state.mention_already_present;
            report.author = inserted.author;
            report.composition = Some(inserted.composition);
            pause(timings.post_insert()).await;
            report.enter(SequencerPhase::TextInserted);
        }

        if steps.upload_images {
            let anchor = state.input.or(state.container);
            report.attached_to = upload::attach_images(
                page,
                anchor,
                &job.images,
                search.input_ancestor_levels,
            )
            .await?;
            if report.attached_to.is_some() {
                pause(timings.post_upload()).await;
            }
            report.enter(SequencerPhase::ImagesAttached);
        }

        if steps.submit_reply
            && let Some(input_el) = state.input
        {
            let path = submit::submit_reply(
                page,
                input_el,
                &job.message,
                timings.submit_check(),
                search.submit_ancestor_levels,
            )
            .await?;
            report.submit = Some(path);
            report.enter(SequencerPhase::Submitted);
        }

        Ok(())
    }
}
