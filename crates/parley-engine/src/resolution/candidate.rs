use parley_common::protocol::ElementHandle;
use serde::Serialize;
use std::fmt;

/// A possible container for the target comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub container: ElementHandle,
    /// The identifier matched under the key expected for the current mode,
    /// rather than merely appearing somewhere in the link.
    pub is_exact_match: bool,
    pub nesting_depth: usize,
}

/// Container search strategies, most precise first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Links whose query string names the comment, walked up to their article.
    AnchorHref,
    /// Elements whose data attributes embed the identifier.
    DataAttribute,
    /// Every article region, scanned for a link naming the comment.
    ArticleScan,
}

impl CandidateStrategy {
    pub const ORDERED: [CandidateStrategy; 3] = [
        CandidateStrategy::AnchorHref,
        CandidateStrategy::DataAttribute,
        CandidateStrategy::ArticleScan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CandidateStrategy::AnchorHref => "anchor_href",
            CandidateStrategy::DataAttribute => "data_attribute",
            CandidateStrategy::ArticleScan => "article_scan",
        }
    }
}

impl fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Candidates produced by the first strategy that found any.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub strategy: Option<CandidateStrategy>,
    pub candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
