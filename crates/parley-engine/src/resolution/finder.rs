//! Candidate container search.
//!
//! The target site renders comments without stable ids, so the container is
//! recovered from whatever still names the comment: permalink query strings,
//! data attributes, or as a last resort a scan of every article region.
//!
//! Strategies (in priority order, first non-empty result wins):
//! 1. Anchor href: `a[href*="comment_id="]` → nearest `[role="article"]`
//! 2. Data attribute: `[data-commentid="…"]` and friends → nearest article
//! 3. Article scan: every article whose descendant links carry the id

use super::candidate::{Candidate, CandidateSet, CandidateStrategy};
use crate::locator::link_comment_ids;
use crate::page::{Page, describe_if_attached};
use parley_common::error::DomError;
use parley_common::protocol::ElementHandle;
use tracing::debug;

pub const ARTICLE_SELECTOR: &str = r#"[role="article"]"#;
const COMMENT_LINK_SELECTOR: &str = r#"a[href*="comment_id="]"#;
const LINK_SELECTOR: &str = "a[href]";
const ID_DATA_ATTRIBUTES: &[&str] = &["data-commentid", "data-comment-id"];
const EMBEDDING_DATA_ATTRIBUTES: &[&str] = &["data-ft"];

pub struct CandidateFinder;

impl CandidateFinder {
    /// Run the strategies in order and return the first non-empty result.
    pub async fn find<P: Page + ?Sized>(
        page: &P,
        resolved_id: &str,
        is_nested_target: bool,
    ) -> Result<CandidateSet, DomError> {
        for strategy in CandidateStrategy::ORDERED {
            let candidates = Self::run(strategy, page, resolved_id, is_nested_target).await?;
            debug!(
                "Strategy {} found {} candidate(s) for {}",
                strategy,
                candidates.len(),
                resolved_id
            );
            if !candidates.is_empty() {
                return Ok(CandidateSet {
                    strategy: Some(strategy),
                    candidates,
                });
            }
        }
        Ok(CandidateSet::default())
    }

    /// Run a single strategy.
    pub async fn run<P: Page + ?Sized>(
        strategy: CandidateStrategy,
        page: &P,
        id: &str,
        nested: bool,
    ) -> Result<Vec<Candidate>, DomError> {
        match strategy {
            CandidateStrategy::AnchorHref => find_by_anchor_href(page, id, nested).await,
            CandidateStrategy::DataAttribute => find_by_data_attribute(page, id).await,
            CandidateStrategy::ArticleScan => find_by_article_scan(page, id, nested).await,
        }
    }
}

/// Whether a link names `id`, and if so whether it is an exact match.
///
/// A reply permalink carries both keys, so a top-level search must reject
/// links that also carry `reply_comment_id`; otherwise a reply would be
/// mistaken for its parent comment.
pub fn classify_link(href: &str, id: &str, nested: bool) -> Option<bool> {
    let (comment, reply) = link_comment_ids(href);
    let comment_matches = comment.as_deref() == Some(id);
    let reply_matches = reply.as_deref() == Some(id);
    if !comment_matches && !reply_matches {
        return None;
    }
    let exact = if nested {
        reply_matches
    } else {
        comment_matches && reply.is_none()
    };
    Some(exact)
}

fn merge(candidates: &mut Vec<Candidate>, container: ElementHandle, exact: bool) -> bool {
    if let Some(existing) = candidates.iter_mut().find(|c| c.container == container) {
        existing.is_exact_match |= exact;
        return true;
    }
    false
}

async fn find_by_anchor_href<P: Page + ?Sized>(
    page: &P,
    id: &str,
    nested: bool,
) -> Result<Vec<Candidate>, DomError> {
    let mut candidates = Vec::new();

    for link in page.query_all(None, COMMENT_LINK_SELECTOR).await? {
        let Some(info) = describe_if_attached(page, link).await? else {
            continue;
        };
        let Some(exact) = info.href().and_then(|href| classify_link(href, id, nested)) else {
            continue;
        };
        let Some(container) = page.closest(link, ARTICLE_SELECTOR).await? else {
            continue;
        };
        if merge(&mut candidates, container, exact) {
            continue;
        }
        let nesting_depth = page.depth(container).await?;
        candidates.push(Candidate {
            container,
            is_exact_match: exact,
            nesting_depth,
        });
    }

    Ok(candidates)
}

async fn find_by_data_attribute<P: Page + ?Sized>(
    page: &P,
    id: &str,
) -> Result<Vec<Candidate>, DomError> {
    let escaped = escape_attribute_value(id);
    let selector = ID_DATA_ATTRIBUTES
        .iter()
        .map(|attr| format!(r#"[{}="{}"]"#, attr, escaped))
        .chain(
            EMBEDDING_DATA_ATTRIBUTES
                .iter()
                .map(|attr| format!(r#"[{}*="{}"]"#, attr, escaped)),
        )
        .collect::<Vec<_>>()
        .join(", ");

    for el in page.query_all(None, &selector).await? {
        let Some(container) = page.closest(el, ARTICLE_SELECTOR).await? else {
            continue;
        };
        let Some(info) = describe_if_attached(page, el).await? else {
            continue;
        };
        let exact = ID_DATA_ATTRIBUTES
            .iter()
            .any(|attr| info.attr(attr) == Some(id));
        let nesting_depth = page.depth(container).await?;
        return Ok(vec![Candidate {
            container,
            is_exact_match: exact,
            nesting_depth,
        }]);
    }

    Ok(Vec::new())
}

async fn find_by_article_scan<P: Page + ?Sized>(
    page: &P,
    id: &str,
    nested: bool,
) -> Result<Vec<Candidate>, DomError> {
    let mut candidates = Vec::new();

    for article in page.query_all(None, ARTICLE_SELECTOR).await? {
        let mut matched: Option<bool> = None;
        for link in page.query_all(Some(article), LINK_SELECTOR).await? {
            let Some(info) = describe_if_attached(page, link).await? else {
                continue;
            };
            if let Some(exact) = info.href().and_then(|href| classify_link(href, id, nested)) {
                matched = Some(matched.unwrap_or(false) || exact);
            }
        }

        if let Some(exact) = matched {
            let nesting_depth = page.depth(article).await?;
            candidates.push(Candidate {
                container: article,
                is_exact_match: exact,
                nesting_depth,
            });
        }
    }

    Ok(candidates)
}

/// Escape a value for use inside a double-quoted CSS attribute selector.
fn escape_attribute_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
