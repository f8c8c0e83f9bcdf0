pub mod author;
pub mod candidate;
pub mod finder;
pub mod ranker;

pub use author::{AuthorHeuristic, AuthorMatch, AuthorResolver};
pub use candidate::{Candidate, CandidateSet, CandidateStrategy};
pub use finder::{ARTICLE_SELECTOR, CandidateFinder};
pub use ranker::rank;

use crate::locator::TargetLocator;
use crate::page::Page;
use parley_common::error::DomError;
use tracing::info;

/// Outcome of finding the working container for a locator.
#[derive(Debug, Clone, Default)]
pub struct ContainerResolution {
    pub strategy: Option<CandidateStrategy>,
    pub candidate_count: usize,
    pub selected: Option<Candidate>,
}

/// Finder followed by ranker. An empty locator resolves to no container,
/// which downstream steps treat as "search the whole document".
pub async fn resolve_container<P: Page + ?Sized>(
    page: &P,
    locator: &TargetLocator,
) -> Result<ContainerResolution, DomError> {
    let Some(id) = locator.resolved_id.as_deref() else {
        info!("No comment id in page address, searching globally");
        return Ok(ContainerResolution::default());
    };

    let set = CandidateFinder::find(page, id, locator.is_nested_target).await?;
    let candidate_count = set.candidates.len();
    let selected = rank(set.candidates, locator.is_nested_target);

    match &selected {
        Some(c) => info!(
            "Selected container {} (exact: {}, depth: {}) via {} among {} candidate(s)",
            c.container,
            c.is_exact_match,
            c.nesting_depth,
            set.strategy.map(|s| s.name()).unwrap_or("none"),
            candidate_count
        ),
        None => info!("No container found for comment {}", id),
    }

    Ok(ContainerResolution {
        strategy: set.strategy,
        candidate_count,
        selected,
    })
}
