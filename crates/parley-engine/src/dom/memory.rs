//! In-memory `Page` over a static HTML document.
//!
//! Used for dry runs against saved pages and for tests. Markup is parsed with
//! `scraper` and never restructured; editing is modelled as per-element
//! content overrides, and every mutating call is appended to a journal.
//! Reactions registered with [`MemoryPage::on_event`] stand in for the host
//! page's own scripts (opening a reply box, inserting a mention, clearing the
//! box after Enter).
//!
//! Layout is synthetic but consistent: element `i` in document order starts
//! at `y = i * ROW_HEIGHT` and spans its whole subtree, indented by depth, so
//! descendants always lie inside their ancestors' boxes.

use crate::page::Page;
use async_trait::async_trait;
use parley_common::error::DomError;
use parley_common::protocol::{
    ElementHandle, ElementInfo, KeyEvent, PointerEvent, PointerEventKind, Rect,
};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

const ROW_HEIGHT: f32 = 24.0;
const PAGE_WIDTH: f32 = 800.0;
const INDENT: f32 = 8.0;
const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// Something the engine did to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Pointer {
        target: ElementHandle,
        event: PointerEvent,
    },
    Key {
        target: ElementHandle,
        event: KeyEvent,
    },
    Focus(ElementHandle),
    CaretToEnd(ElementHandle),
    ContentCleared(ElementHandle),
    TextInserted {
        target: ElementHandle,
        text: String,
    },
    ValueSet {
        target: ElementHandle,
        value: String,
    },
    Input(ElementHandle),
    FilesAttached {
        target: ElementHandle,
        files: Vec<PathBuf>,
    },
}

impl DomEvent {
    pub fn target(&self) -> ElementHandle {
        match self {
            DomEvent::Pointer { target, .. }
            | DomEvent::Key { target, .. }
            | DomEvent::TextInserted { target, .. }
            | DomEvent::ValueSet { target, .. }
            | DomEvent::FilesAttached { target, .. } => *target,
            DomEvent::Focus(target)
            | DomEvent::CaretToEnd(target)
            | DomEvent::ContentCleared(target)
            | DomEvent::Input(target) => *target,
        }
    }

    /// True for the `click` at the end of a simulated pointer sequence.
    pub fn is_click(&self) -> bool {
        matches!(
            self,
            DomEvent::Pointer { event, .. } if event.kind == PointerEventKind::Click
        )
    }

    /// True for events that change what the document contains.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            DomEvent::ContentCleared(_)
                | DomEvent::TextInserted { .. }
                | DomEvent::ValueSet { .. }
                | DomEvent::FilesAttached { .. }
        )
    }
}

/// Mutable side of the page: edits, visibility toggles, focus, journal.
#[derive(Debug, Default)]
pub struct PageState {
    content: HashMap<ElementHandle, String>,
    hidden: HashMap<ElementHandle, bool>,
    files: HashMap<ElementHandle, Vec<PathBuf>>,
    focused: Option<ElementHandle>,
    journal: Vec<DomEvent>,
}

impl PageState {
    /// Replace an element's content. Its original children stop matching
    /// queries from then on.
    pub fn set_content(&mut self, el: ElementHandle, text: impl Into<String>) {
        self.content.insert(el, text.into());
    }

    pub fn content(&self, el: ElementHandle) -> Option<&str> {
        self.content.get(&el).map(String::as_str)
    }

    pub fn set_hidden(&mut self, el: ElementHandle, hidden: bool) {
        self.hidden.insert(el, hidden);
    }

    pub fn files(&self, el: ElementHandle) -> Option<&[PathBuf]> {
        self.files.get(&el).map(Vec::as_slice)
    }

    pub fn focused(&self) -> Option<ElementHandle> {
        self.focused
    }

    pub fn journal(&self) -> &[DomEvent] {
        &self.journal
    }
}

type Reaction = Box<dyn Fn(&DomEvent, &mut PageState) + Send + Sync>;

pub struct MemoryPage {
    url: String,
    doc: Mutex<Html>,
    state: PageState,
    reactions: Vec<Reaction>,
}

impl std::fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPage")
            .field("url", &self.url)
            .field("state", &self.state)
            .field("reactions", &self.reactions.len())
            .finish()
    }
}

/// Elements of a document in pre-order, with their handles.
struct Indexed<'a> {
    elements: Vec<ElementRef<'a>>,
}

impl<'a> Indexed<'a> {
    fn new(doc: &'a Html) -> Self {
        let elements = doc
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect();
        Self { elements }
    }

    fn get(&self, el: ElementHandle) -> Result<ElementRef<'a>, DomError> {
        self.elements
            .get(el.0 as usize)
            .copied()
            .ok_or(DomError::StaleElement(el))
    }

    fn handle_of(&self, el: &ElementRef<'a>) -> Option<ElementHandle> {
        self.elements
            .iter()
            .position(|e| e.id() == el.id())
            .map(|i| ElementHandle(i as u32))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|_| DomError::InvalidSelector(selector.to_string()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_rich_text(el: &ElementRef<'_>) -> bool {
    matches!(
        el.value().attr("contenteditable"),
        Some("" | "true" | "plaintext-only")
    )
}

fn hidden_by_markup(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    if NON_RENDERED_TAGS.contains(&value.name()) || value.attr("hidden").is_some() {
        return true;
    }
    if value.name() == "input" && value.attr("type") == Some("hidden") {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            doc: Mutex::new(Html::parse_document(html)),
            state: PageState::default(),
            reactions: Vec::new(),
        }
    }

    /// Register a host-page reaction, run after every recorded event.
    pub fn on_event<F>(&mut self, reaction: F)
    where
        F: Fn(&DomEvent, &mut PageState) + Send + Sync + 'static,
    {
        self.reactions.push(Box::new(reaction));
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    pub fn journal(&self) -> &[DomEvent] {
        self.state.journal()
    }

    fn doc(&self) -> MutexGuard<'_, Html> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All live matches of `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, DomError> {
        self.select(None, selector)
    }

    /// First live match of `selector`.
    pub fn find(&self, selector: &str) -> Result<Option<ElementHandle>, DomError> {
        Ok(self.select(None, selector)?.into_iter().next())
    }

    /// What a user would read in the element right now.
    pub fn content_of(&self, el: ElementHandle) -> Result<String, DomError> {
        Ok(self.describe_sync(el)?.content().to_string())
    }

    fn record(&mut self, event: DomEvent) {
        self.state.journal.push(event.clone());
        for reaction in &self.reactions {
            reaction(&event, &mut self.state);
        }
    }

    fn select(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DomError> {
        let selector = parse_selector(selector)?;
        let doc = self.doc();
        let index = Indexed::new(&doc);
        let handles: HashMap<_, ElementHandle> = index
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id(), ElementHandle(i as u32)))
            .collect();
        // Overriding an element's content detaches its original children.
        let overridden: Vec<_> = self
            .state
            .content
            .keys()
            .filter_map(|h| index.elements.get(h.0 as usize))
            .map(|e| e.id())
            .collect();

        let matches: Vec<ElementRef<'_>> = match scope {
            Some(scope) => index.get(scope)?.select(&selector).collect(),
            None => doc.select(&selector).collect(),
        };

        Ok(matches
            .iter()
            .filter(|el| {
                !el.ancestors()
                    .any(|a| overridden.iter().any(|id| *id == a.id()))
            })
            .filter_map(|el| handles.get(&el.id()).copied())
            .collect())
    }

    fn text_of(&self, index: &Indexed<'_>, el: &ElementRef<'_>) -> String {
        if let Some(handle) = index.handle_of(el)
            && let Some(content) = self.state.content.get(&handle)
        {
            return content.clone();
        }

        let mut out = String::new();
        for child in el.children() {
            match child.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        out.push(' ');
                        out.push_str(&self.text_of(index, &child_el));
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn is_visible(&self, index: &Indexed<'_>, el: &ElementRef<'_>) -> bool {
        let mut current = Some(*el);
        while let Some(e) = current {
            let hidden = index
                .handle_of(&e)
                .and_then(|h| self.state.hidden.get(&h).copied())
                .unwrap_or_else(|| hidden_by_markup(&e));
            if hidden {
                return false;
            }
            current = e.parent().and_then(ElementRef::wrap);
        }
        true
    }

    fn depth_of(el: &ElementRef<'_>) -> usize {
        let mut depth = 0;
        let mut current = el.parent().and_then(ElementRef::wrap);
        while let Some(p) = current {
            depth += 1;
            current = p.parent().and_then(ElementRef::wrap);
        }
        depth
    }

    fn describe_sync(&self, handle: ElementHandle) -> Result<ElementInfo, DomError> {
        let doc = self.doc();
        let index = Indexed::new(&doc);
        let el = index.get(handle)?;
        let value = el.value();
        let tag = value.name().to_string();

        let subtree = el.descendants().filter_map(ElementRef::wrap).count();
        let depth = Self::depth_of(&el) as f32;
        let rect = Rect::new(
            depth * INDENT,
            handle.0 as f32 * ROW_HEIGHT,
            (PAGE_WIDTH - depth * INDENT).max(INDENT),
            subtree as f32 * ROW_HEIGHT,
        );

        let rich_text = is_rich_text(&el);
        let override_content = self.state.content.get(&handle).cloned();
        let form_value = match tag.as_str() {
            "input" => Some(
                override_content
                    .clone()
                    .unwrap_or_else(|| value.attr("value").unwrap_or_default().to_string()),
            ),
            "textarea" => Some(
                override_content
                    .clone()
                    .unwrap_or_else(|| el.text().collect::<String>()),
            ),
            _ => None,
        };

        Ok(ElementInfo {
            handle,
            text: collapse_whitespace(&self.text_of(&index, &el)),
            attributes: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            rect,
            visible: self.is_visible(&index, &el),
            rich_text,
            value: form_value,
            tag,
        })
    }
}

#[async_trait]
impl Page for MemoryPage {
    async fn current_url(&self) -> Result<String, DomError> {
        Ok(self.url.clone())
    }

    async fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DomError> {
        self.select(scope, selector)
    }

    async fn closest(
        &self,
        el: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DomError> {
        let selector = parse_selector(selector)?;
        let doc = self.doc();
        let index = Indexed::new(&doc);
        let mut current = Some(index.get(el)?);
        while let Some(e) = current {
            if selector.matches(&e) {
                return Ok(index.handle_of(&e));
            }
            current = e.parent().and_then(ElementRef::wrap);
        }
        Ok(None)
    }

    async fn parent(&self, el: ElementHandle) -> Result<Option<ElementHandle>, DomError> {
        let doc = self.doc();
        let index = Indexed::new(&doc);
        let e = index.get(el)?;
        Ok(e.parent()
            .and_then(ElementRef::wrap)
            .and_then(|p| index.handle_of(&p)))
    }

    async fn describe(&self, el: ElementHandle) -> Result<ElementInfo, DomError> {
        self.describe_sync(el)
    }

    async fn depth(&self, el: ElementHandle) -> Result<usize, DomError> {
        let doc = self.doc();
        let index = Indexed::new(&doc);
        Ok(Self::depth_of(&index.get(el)?))
    }

    async fn dispatch_pointer(
        &mut self,
        el: ElementHandle,
        event: PointerEvent,
    ) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.record(DomEvent::Pointer { target: el, event });
        Ok(())
    }

    async fn dispatch_key(&mut self, el: ElementHandle, event: KeyEvent) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.record(DomEvent::Key { target: el, event });
        Ok(())
    }

    async fn focus(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.state.focused = Some(el);
        self.record(DomEvent::Focus(el));
        Ok(())
    }

    async fn move_caret_to_end(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.record(DomEvent::CaretToEnd(el));
        Ok(())
    }

    async fn clear_content(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.state.content.insert(el, String::new());
        self.record(DomEvent::ContentCleared(el));
        Ok(())
    }

    async fn insert_text(&mut self, el: ElementHandle, text: &str) -> Result<(), DomError> {
        let current = self.describe_sync(el)?.content().to_string();
        self.state.content.insert(el, format!("{}{}", current, text));
        self.record(DomEvent::TextInserted {
            target: el,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn set_value(&mut self, el: ElementHandle, value: &str) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.state.content.insert(el, value.to_string());
        self.record(DomEvent::ValueSet {
            target: el,
            value: value.to_string(),
        });
        Ok(())
    }

    async fn dispatch_input(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.record(DomEvent::Input(el));
        Ok(())
    }

    async fn set_input_files(
        &mut self,
        el: ElementHandle,
        files: &[PathBuf],
    ) -> Result<(), DomError> {
        self.describe_sync(el)?;
        self.state.files.insert(el, files.to_vec());
        self.record(DomEvent::FilesAttached {
            target: el,
            files: files.to_vec(),
        });
        Ok(())
    }
}
