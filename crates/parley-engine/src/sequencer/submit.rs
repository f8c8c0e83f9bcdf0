//! Reply submission.
//!
//! Enter is the primary path. When the message is still in the box after the
//! check delay, a labelled submit control is searched for in the enclosing
//! form, or a bounded ancestor chain when there is no form.
//!
//! The ancestor climb eventually reaches the thread around the composer, where
//! the comment's own "Reply" affordance also carries a submit-like label.
//! Controls inside another comment's article are never taken, and once the
//! climb has reached a level holding such an article, reply labels are
//! rejected as well.

use super::pause;
use crate::lexicon::{is_reply_label, is_submit_label, mentions_excluded_control};
use crate::page::{Page, describe_if_attached};
use crate::resolution::ARTICLE_SELECTOR;
use crate::simulator::{press_enter, simulate_click};
use parley_common::error::DomError;
use parley_common::protocol::{ElementHandle, ElementInfo};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const SUBMIT_CONTROL_SELECTOR: &str =
    r#"button, [role="button"], input[type="submit"], [aria-label]"#;
const CONTROL_IMAGERY_SELECTOR: &str = "img[alt], svg[aria-label], image[aria-label]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPath {
    /// The input emptied (or went away) after Enter.
    EnterKey,
    /// A submit control was clicked after Enter had no visible effect.
    Button,
    /// Neither path could be confirmed.
    Unconfirmed,
}

fn still_contains(content: &str, message: &str) -> bool {
    let message = message.trim();
    !message.is_empty() && content.contains(message)
}

async fn is_excluded_control<P: Page + ?Sized>(
    page: &P,
    info: &ElementInfo,
) -> Result<bool, DomError> {
    let own_labels = [
        info.aria_label(),
        info.attr("title"),
        info.attr("data-testid"),
        Some(info.text.as_str()),
    ];
    if own_labels
        .into_iter()
        .flatten()
        .any(mentions_excluded_control)
    {
        return Ok(true);
    }

    for img in page
        .query_all(Some(info.handle), CONTROL_IMAGERY_SELECTOR)
        .await?
    {
        let Some(img) = describe_if_attached(page, img).await? else {
            continue;
        };
        if [img.attr("alt"), img.aria_label()]
            .into_iter()
            .flatten()
            .any(mentions_excluded_control)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The input's ancestor chain, used to tell the composer's own surroundings
/// from neighbouring comments.
struct Lineage {
    ancestors: Vec<ElementHandle>,
}

impl Lineage {
    async fn of<P: Page + ?Sized>(page: &P, input: ElementHandle) -> Result<Self, DomError> {
        let mut ancestors = Vec::new();
        let mut current = page.parent(input).await?;
        while let Some(p) = current {
            ancestors.push(p);
            current = page.parent(p).await?;
        }
        Ok(Self { ancestors })
    }

    fn contains(&self, el: ElementHandle) -> bool {
        self.ancestors.contains(&el)
    }

    /// Whether `el` sits in an article the input is not part of.
    async fn is_foreign<P: Page + ?Sized>(
        &self,
        page: &P,
        el: ElementHandle,
    ) -> Result<bool, DomError> {
        Ok(page
            .closest(el, ARTICLE_SELECTOR)
            .await?
            .is_some_and(|article| !self.contains(article)))
    }

    /// Whether `scope` holds an article the input is not part of.
    async fn reaches_thread<P: Page + ?Sized>(
        &self,
        page: &P,
        scope: ElementHandle,
    ) -> Result<bool, DomError> {
        Ok(page
            .query_all(Some(scope), ARTICLE_SELECTOR)
            .await?
            .into_iter()
            .any(|article| !self.contains(article)))
    }
}

/// Restrictions for a scope outside any form.
struct Climb<'a> {
    lineage: &'a Lineage,
    at_thread: bool,
}

async fn first_submit_control_in<P: Page + ?Sized>(
    page: &P,
    scope: ElementHandle,
    input: ElementHandle,
    climb: Option<Climb<'_>>,
) -> Result<Option<ElementHandle>, DomError> {
    for el in page.query_all(Some(scope), SUBMIT_CONTROL_SELECTOR).await? {
        if el == input {
            continue;
        }
        let Some(info) = describe_if_attached(page, el).await? else {
            continue;
        };
        if !info.visible {
            continue;
        }
        let labelled = info.aria_label().is_some_and(is_submit_label)
            || is_submit_label(&info.text)
            || info.attr("type") == Some("submit");
        if !labelled || is_excluded_control(page, &info).await? {
            continue;
        }
        if let Some(climb) = &climb {
            let reply_like =
                is_reply_label(&info.text) || info.aria_label().is_some_and(is_reply_label);
            if climb.at_thread && reply_like {
                debug!("Skipping reply affordance {} outside the composer", el);
                continue;
            }
            if climb.lineage.is_foreign(page, el).await? {
                debug!("Skipping {} inside another comment", el);
                continue;
            }
        }
        return Ok(Some(el));
    }
    Ok(None)
}

/// Search the enclosing form, else each ancestor up to `max_levels`.
pub async fn find_submit_control<P: Page + ?Sized>(
    page: &P,
    input: ElementHandle,
    max_levels: usize,
) -> Result<Option<ElementHandle>, DomError> {
    if let Some(form) = page.closest(input, "form").await? {
        return first_submit_control_in(page, form, input, None).await;
    }

    let lineage = Lineage::of(page, input).await?;
    let mut at_thread = false;
    for &scope in lineage.ancestors.iter().take(max_levels) {
        at_thread = at_thread || lineage.reaches_thread(page, scope).await?;
        let climb = Climb {
            lineage: &lineage,
            at_thread,
        };
        if let Some(el) = first_submit_control_in(page, scope, input, Some(climb)).await? {
            return Ok(Some(el));
        }
    }
    Ok(None)
}

pub async fn submit_reply<P: Page + ?Sized>(
    page: &mut P,
    input: ElementHandle,
    message: &str,
    check_delay: Duration,
    max_levels: usize,
) -> Result<SubmitPath, DomError> {
    page.focus(input).await?;
    press_enter(page, input).await?;
    pause(check_delay).await;

    let pending = match describe_if_attached(&*page, input).await? {
        Some(info) => still_contains(info.content(), message),
        None => false,
    };
    if !pending {
        debug!("Input cleared after Enter, reply submitted");
        return Ok(SubmitPath::EnterKey);
    }

    let control = match find_submit_control(&*page, input, max_levels).await {
        Ok(control) => control,
        Err(e) if e.is_stale() => None,
        Err(e) => return Err(e),
    };
    match control {
        Some(button) => {
            info!("Enter did not submit, clicking submit control {}", button);
            simulate_click(page, button).await?;
            Ok(SubmitPath::Button)
        }
        None => {
            warn!("Submit control not found, submission unconfirmed");
            Ok(SubmitPath::Unconfirmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_check_ignores_blank_messages() {
        assert!(still_contains("@Jane hello", "hello"));
        assert!(!still_contains("", "hello"));
        assert!(!still_contains("anything", "   "));
    }
}
