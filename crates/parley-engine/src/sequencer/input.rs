//! Comment input resolution and text insertion.

use super::compose::{Composition, InsertMode, compose};
use super::pause;
use crate::config::TimingConfig;
use crate::page::{Page, ancestor, describe_if_attached};
use crate::resolution::{AuthorMatch, AuthorResolver};
use crate::simulator::simulate_click;
use parley_common::error::DomError;
use parley_common::formatter::format_element;
use parley_common::protocol::ElementHandle;
use tracing::{debug, info};

/// Editable region selectors, most specific first.
pub const INPUT_SELECTORS: &[&str] = &[
    r#"div[contenteditable="true"][role="textbox"]"#,
    r#"[contenteditable="true"]"#,
    "textarea",
    r#"[role="textbox"]"#,
];

/// Markers the host editor puts on a mention it inserted itself.
const MENTION_MARKER_SELECTOR: &str =
    r#"[data-mention], [data-lexical-mention], [data-mention-id], [data-text-mention]"#;

/// Find the comment input.
///
/// A reply box opened by the host page is rendered as a sibling of the
/// comment, so the scoped search starts a few ancestors above the container
/// and takes the first visible match. The global fallback takes the last
/// visible match, since newer editors are appended later in the document.
pub async fn locate_input<P: Page + ?Sized>(
    page: &P,
    container: Option<ElementHandle>,
    ancestor_levels: usize,
) -> Result<Option<ElementHandle>, DomError> {
    let scope = match container {
        Some(c) => match ancestor(page, c, ancestor_levels).await {
            Ok(scope) => Some(scope),
            Err(e) if e.is_stale() => None,
            Err(e) => return Err(e),
        },
        None => None,
    };

    if let Some(scope) = scope {
        for selector in INPUT_SELECTORS {
            for el in page.query_all(Some(scope), selector).await? {
                if let Some(info) = describe_if_attached(page, el).await?
                    && info.visible
                {
                    debug!(
                        "Input {} found under {} with {}",
                        format_element(&info),
                        scope,
                        selector
                    );
                    return Ok(Some(el));
                }
            }
        }
    }

    for selector in INPUT_SELECTORS {
        let mut last_visible = None;
        for el in page.query_all(None, selector).await? {
            if let Some(info) = describe_if_attached(page, el).await?
                && info.visible
            {
                last_visible = Some(info);
            }
        }
        if let Some(info) = last_visible {
            debug!(
                "Input {} found globally with {}",
                format_element(&info),
                selector
            );
            return Ok(Some(info.handle));
        }
    }

    Ok(None)
}

/// Whether the input already holds a mention, either as a marker element or
/// as `@` text.
pub async fn has_mention<P: Page + ?Sized>(
    page: &P,
    input: ElementHandle,
) -> Result<bool, DomError> {
    if !page
        .query_all(Some(input), MENTION_MARKER_SELECTOR)
        .await?
        .is_empty()
    {
        return Ok(true);
    }
    let info = page.describe(input).await?;
    let text = info.content().trim();
    Ok(text.starts_with('@') || text.contains('@'))
}

/// Poll for a mention the host page inserts on its own after the reply box
/// gains focus.
pub async fn wait_for_mention<P: Page + ?Sized>(
    page: &P,
    input: ElementHandle,
    timings: &TimingConfig,
) -> Result<bool, DomError> {
    let attempts = timings.mention_poll_attempts.max(1);
    for attempt in 1..=attempts {
        if has_mention(page, input).await? {
            debug!("Mention detected on attempt {}/{}", attempt, attempts);
            return Ok(true);
        }
        if attempt < attempts {
            pause(timings.mention_poll_interval()).await;
        }
    }
    Ok(false)
}

/// What the text step did.
#[derive(Debug, Clone)]
pub struct TextInsertion {
    pub mention_already_present: bool,
    pub author: Option<AuthorMatch>,
    pub composition: Composition,
}

/// Focus the input, settle the mention question, and insert the message.
pub async fn insert_message<P: Page + ?Sized>(
    page: &mut P,
    input: ElementHandle,
    container: Option<ElementHandle>,
    message: &str,
    timings: &TimingConfig,
) -> Result<TextInsertion, DomError> {
    page.focus(input).await?;
    simulate_click(page, input).await?;

    let mention_already_present = wait_for_mention(&*page, input, timings).await?;

    let author = match (mention_already_present, container) {
        (false, Some(c)) => match AuthorResolver::resolve(&*page, c).await {
            Ok(author) => author,
            Err(e) if e.is_stale() => None,
            Err(e) => return Err(e),
        },
        _ => None,
    };
    let manual_mention = author.as_ref().map(AuthorMatch::mention);

    let composition = compose(message, mention_already_present, manual_mention.as_deref());
    info!(
        "Inserting {:?} ({:?}) into {}",
        composition.text, composition.mode, input
    );
    apply_composition(page, input, &composition).await?;

    Ok(TextInsertion {
        mention_already_present,
        author,
        composition,
    })
}

/// Rich editors go through the insertion primitive so their internal state
/// follows; form controls get their value assigned.
async fn apply_composition<P: Page + ?Sized>(
    page: &mut P,
    input: ElementHandle,
    composition: &Composition,
) -> Result<(), DomError> {
    let info = page.describe(input).await?;

    if info.rich_text {
        match composition.mode {
            InsertMode::AppendAfterMention => page.move_caret_to_end(input).await?,
            InsertMode::ReplaceWithMention => page.clear_content(input).await?,
            InsertMode::Plain => {}
        }
        page.insert_text(input, &composition.text).await?;
    } else {
        let value = match composition.mode {
            InsertMode::AppendAfterMention => {
                format!("{}{}", info.content(), composition.text)
            }
            InsertMode::ReplaceWithMention | InsertMode::Plain => composition.text.clone(),
        };
        page.set_value(input, &value).await?;
    }

    page.dispatch_input(input).await
}
