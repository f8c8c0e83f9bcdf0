//! Reply affordance search.
//!
//! The reply link is usually inside the comment's article, but some layouts
//! render the action bar as a sibling, and others detach it entirely. Scopes
//! widen in that order.

use crate::lexicon::is_reply_label;
use crate::page::{Page, describe_if_attached};
use crate::simulator::simulate_click;
use parley_common::error::DomError;
use parley_common::protocol::{ElementHandle, ElementInfo};
use serde::Serialize;
use tracing::{debug, info, warn};

const INTERACTIVE_SELECTOR: &str = r#"[role="button"], button, a, [tabindex]"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceScope {
    /// Interactive descendants of the container.
    Container,
    /// Descendants of the container's parent.
    ContainerParent,
    /// Anywhere in the document, within a vertical band around the container.
    VerticalWindow,
    /// Anywhere in the document. Only used when there is no container.
    Document,
}

impl AffordanceScope {
    pub fn name(&self) -> &'static str {
        match self {
            AffordanceScope::Container => "container",
            AffordanceScope::ContainerParent => "container_parent",
            AffordanceScope::VerticalWindow => "vertical_window",
            AffordanceScope::Document => "document",
        }
    }
}

fn is_reply_affordance(info: &ElementInfo) -> bool {
    is_reply_label(&info.text) || info.aria_label().is_some_and(is_reply_label)
}

/// First visible reply affordance under `scope`, optionally restricted to a
/// vertical band `(top, bottom)`.
async fn first_reply_in<P: Page + ?Sized>(
    page: &P,
    scope: Option<ElementHandle>,
    band: Option<(f32, f32)>,
) -> Result<Option<ElementHandle>, DomError> {
    for el in page.query_all(scope, INTERACTIVE_SELECTOR).await? {
        let Some(info) = describe_if_attached(page, el).await? else {
            continue;
        };
        if !info.visible {
            continue;
        }
        if let Some((top, bottom)) = band
            && !info.rect.within_band(top, bottom)
        {
            continue;
        }
        if is_reply_affordance(&info) {
            return Ok(Some(el));
        }
    }
    Ok(None)
}

/// Locate the reply affordance for `container`, widening the scope step by
/// step. A stale container is treated like a missing one.
pub async fn find_reply_affordance<P: Page + ?Sized>(
    page: &P,
    container: Option<ElementHandle>,
    window_px: f32,
) -> Result<Option<(ElementHandle, AffordanceScope)>, DomError> {
    let container_info = match container {
        Some(c) => describe_if_attached(page, c).await?,
        None => None,
    };

    let Some(container_info) = container_info else {
        return Ok(first_reply_in(page, None, None)
            .await?
            .map(|el| (el, AffordanceScope::Document)));
    };
    let container = container_info.handle;

    if let Some(el) = first_reply_in(page, Some(container), None).await? {
        return Ok(Some((el, AffordanceScope::Container)));
    }
    debug!("No reply affordance inside {}, trying its parent", container);

    if let Some(parent) = page.parent(container).await?
        && let Some(el) = first_reply_in(page, Some(parent), None).await?
    {
        return Ok(Some((el, AffordanceScope::ContainerParent)));
    }
    debug!("No reply affordance next to {}, trying a vertical window", container);

    let rect = container_info.rect;
    let band = (rect.y - window_px, rect.bottom() + window_px);
    Ok(first_reply_in(page, None, Some(band))
        .await?
        .map(|el| (el, AffordanceScope::VerticalWindow)))
}

/// Click the reply affordance if one can be found. Not finding one is not an
/// error: the reply box may already be open.
pub async fn open_reply_box<P: Page + ?Sized>(
    page: &mut P,
    container: Option<ElementHandle>,
    window_px: f32,
) -> Result<Option<AffordanceScope>, DomError> {
    match find_reply_affordance(&*page, container, window_px).await? {
        Some((el, scope)) => {
            info!("Clicking reply affordance {} found in {} scope", el, scope.name());
            simulate_click(page, el).await?;
            Ok(Some(scope))
        }
        None => {
            warn!("Reply affordance not found, continuing without it");
            Ok(None)
        }
    }
}
