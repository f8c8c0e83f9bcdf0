//! Target extraction from a page address.
//!
//! Comment permalinks carry `comment_id`, and reply permalinks additionally
//! carry `reply_comment_id`. The presence of the latter switches the whole
//! pipeline into nested-target mode.

use serde::Serialize;
use url::Url;

pub const COMMENT_ID_KEY: &str = "comment_id";
pub const REPLY_COMMENT_ID_KEY: &str = "reply_comment_id";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TargetLocator {
    pub primary_id: Option<String>,
    pub secondary_id: Option<String>,
    pub resolved_id: Option<String>,
    pub is_nested_target: bool,
}

impl TargetLocator {
    pub fn new(primary_id: Option<String>, secondary_id: Option<String>) -> Self {
        let primary_id = primary_id.filter(|v| !v.is_empty());
        let secondary_id = secondary_id.filter(|v| !v.is_empty());
        let resolved_id = secondary_id.clone().or_else(|| primary_id.clone());
        let is_nested_target = secondary_id.is_some();
        Self {
            primary_id,
            secondary_id,
            resolved_id,
            is_nested_target,
        }
    }

    /// Never fails: an unparseable address yields an empty locator.
    pub fn from_url(address: &str) -> Self {
        match Url::parse(address) {
            Ok(url) => {
                let (primary, secondary) = comment_ids(url.query_pairs());
                Self::new(primary, secondary)
            }
            Err(_) => Self::from_query(address),
        }
    }

    /// Extract ids from a bare or relative address (`/x?comment_id=1`).
    pub fn from_query(address: &str) -> Self {
        let (primary, secondary) = comment_ids(link_query_pairs(address));
        Self::new(primary, secondary)
    }

    /// True when no identifier was found: downstream stages search globally.
    pub fn is_empty(&self) -> bool {
        self.resolved_id.is_none()
    }
}

/// The `comment_id` and `reply_comment_id` values from query pairs.
fn comment_ids<'a, I>(pairs: I) -> (Option<String>, Option<String>)
where
    I: IntoIterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
{
    let mut primary = None;
    let mut secondary = None;
    for (key, value) in pairs {
        match key.as_ref() {
            COMMENT_ID_KEY if primary.is_none() => primary = Some(value.into_owned()),
            REPLY_COMMENT_ID_KEY if secondary.is_none() => secondary = Some(value.into_owned()),
            _ => {}
        }
    }
    (primary, secondary)
}

/// Query pairs of a possibly relative link. Fragments are dropped.
pub fn link_query_pairs(href: &str) -> url::form_urlencoded::Parse<'_> {
    let without_fragment = href.split('#').next().unwrap_or("");
    let query = without_fragment
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or("");
    url::form_urlencoded::parse(query.as_bytes())
}

/// Comment ids carried by a link, as `(comment_id, reply_comment_id)`.
pub fn link_comment_ids(href: &str) -> (Option<String>, Option<String>) {
    comment_ids(link_query_pairs(href))
}
