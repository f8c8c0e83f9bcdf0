//! Author name inference for a comment container.
//!
//! Used only when the host page did not insert a mention itself. The result
//! is best effort: `None` means the reply goes out without a mention.

use crate::lexicon::{
    href_references_comment, href_references_media, is_plausible_name, is_profile_url,
};
use crate::page::{Page, describe_if_attached};
use parley_common::error::DomError;
use parley_common::protocol::ElementHandle;
use serde::Serialize;
use std::fmt;
use tracing::debug;

const LINK_SELECTOR: &str = "a[href]";
const AUTHOR_MARKUP_SELECTOR: &str = concat!(
    "strong, h3 span, h4 span, span[dir=\"auto\"], ",
    "[data-testid*=\"author\"], [class*=\"author\"], [data-author]"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorHeuristic {
    /// First link whose text reads like a name.
    NameLikeLink,
    /// Author-style inline text next to a non-comment link.
    AuthorMarkup,
    /// Any link shaped like a profile URL.
    ProfileUrl,
}

impl AuthorHeuristic {
    pub const ORDERED: [AuthorHeuristic; 3] = [
        AuthorHeuristic::NameLikeLink,
        AuthorHeuristic::AuthorMarkup,
        AuthorHeuristic::ProfileUrl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuthorHeuristic::NameLikeLink => "name_like_link",
            AuthorHeuristic::AuthorMarkup => "author_markup",
            AuthorHeuristic::ProfileUrl => "profile_url",
        }
    }
}

impl fmt::Display for AuthorHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorMatch {
    pub name: String,
    pub heuristic: AuthorHeuristic,
}

impl AuthorMatch {
    /// Mention text to type ahead of the message, e.g. `"@Jane Doe "`.
    pub fn mention(&self) -> String {
        format!("@{} ", self.name)
    }
}

pub struct AuthorResolver;

impl AuthorResolver {
    pub async fn resolve<P: Page + ?Sized>(
        page: &P,
        container: ElementHandle,
    ) -> Result<Option<AuthorMatch>, DomError> {
        for heuristic in AuthorHeuristic::ORDERED {
            if let Some(name) = Self::run(heuristic, page, container).await? {
                debug!("Author '{}' found by {}", name, heuristic);
                return Ok(Some(AuthorMatch { name, heuristic }));
            }
        }
        debug!("No author name found in {}", container);
        Ok(None)
    }

    pub async fn run<P: Page + ?Sized>(
        heuristic: AuthorHeuristic,
        page: &P,
        container: ElementHandle,
    ) -> Result<Option<String>, DomError> {
        match heuristic {
            AuthorHeuristic::NameLikeLink => name_like_link(page, container).await,
            AuthorHeuristic::AuthorMarkup => author_markup(page, container).await,
            AuthorHeuristic::ProfileUrl => profile_url_link(page, container).await,
        }
    }
}

async fn name_like_link<P: Page + ?Sized>(
    page: &P,
    container: ElementHandle,
) -> Result<Option<String>, DomError> {
    for link in page.query_all(Some(container), LINK_SELECTOR).await? {
        let Some(info) = describe_if_attached(page, link).await? else {
            continue;
        };
        let href = info.href().unwrap_or_default();
        if href_references_comment(href) || href_references_media(href) {
            continue;
        }
        if is_plausible_name(&info.text) {
            return Ok(Some(info.text.trim().to_string()));
        }
    }
    Ok(None)
}

/// A link that can carry an author name: present and not a comment permalink.
async fn is_author_link<P: Page + ?Sized>(
    page: &P,
    el: ElementHandle,
) -> Result<bool, DomError> {
    let Some(info) = describe_if_attached(page, el).await? else {
        return Ok(false);
    };
    Ok(info.tag == "a" && info.href().is_some_and(|href| !href_references_comment(href)))
}

async fn author_markup<P: Page + ?Sized>(
    page: &P,
    container: ElementHandle,
) -> Result<Option<String>, DomError> {
    for el in page.query_all(Some(container), AUTHOR_MARKUP_SELECTOR).await? {
        let Some(info) = describe_if_attached(page, el).await? else {
            continue;
        };
        if !is_plausible_name(&info.text) {
            continue;
        }

        let parent_is_link = match page.parent(el).await? {
            Some(parent) => is_author_link(page, parent).await?,
            None => false,
        };

        let mut child_is_link = false;
        if !parent_is_link {
            for link in page.query_all(Some(el), LINK_SELECTOR).await? {
                if page.parent(link).await? == Some(el) && is_author_link(page, link).await? {
                    child_is_link = true;
                    break;
                }
            }
        }

        if parent_is_link || child_is_link {
            return Ok(Some(info.text.trim().to_string()));
        }
    }
    Ok(None)
}

async fn profile_url_link<P: Page + ?Sized>(
    page: &P,
    container: ElementHandle,
) -> Result<Option<String>, DomError> {
    for link in page.query_all(Some(container), LINK_SELECTOR).await? {
        let Some(info) = describe_if_attached(page, link).await? else {
            continue;
        };
        let text = info.text.trim();
        if text.is_empty() || !text.chars().any(char::is_alphabetic) {
            continue;
        }
        if info.href().is_some_and(is_profile_url) {
            return Ok(Some(text.to_string()));
        }
    }
    Ok(None)
}
