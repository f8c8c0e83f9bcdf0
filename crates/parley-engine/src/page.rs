use async_trait::async_trait;
pub use parley_common::error::DomError;
use parley_common::protocol::{ElementHandle, ElementInfo, KeyEvent, PointerEvent};
use std::path::PathBuf;

/// The DOM capability every engine component is written against.
///
/// Query methods never cache: each call reflects the document as it is now.
/// Mutating methods take `&mut self` so a run holds the page exclusively.
#[async_trait]
pub trait Page: Send + Sync {
    /// Address of the current document.
    async fn current_url(&self) -> Result<String, DomError>;

    /// All elements matching a CSS selector, in document order. With a
    /// scope, only strict descendants of the scope are returned.
    async fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DomError>;

    /// Nearest inclusive ancestor matching a CSS selector.
    async fn closest(
        &self,
        el: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DomError>;

    async fn parent(&self, el: ElementHandle) -> Result<Option<ElementHandle>, DomError>;

    async fn describe(&self, el: ElementHandle) -> Result<ElementInfo, DomError>;

    /// Number of element ancestors between `el` and the document root.
    async fn depth(&self, el: ElementHandle) -> Result<usize, DomError> {
        let mut depth = 0;
        let mut current = self.parent(el).await?;
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p).await?;
        }
        Ok(depth)
    }

    async fn dispatch_pointer(
        &mut self,
        el: ElementHandle,
        event: PointerEvent,
    ) -> Result<(), DomError>;

    async fn dispatch_key(&mut self, el: ElementHandle, event: KeyEvent) -> Result<(), DomError>;

    async fn focus(&mut self, el: ElementHandle) -> Result<(), DomError>;

    /// Collapse the selection to the end of the element's content.
    async fn move_caret_to_end(&mut self, el: ElementHandle) -> Result<(), DomError>;

    /// Select and delete the element's editable content.
    async fn clear_content(&mut self, el: ElementHandle) -> Result<(), DomError>;

    /// Insert text at the caret through the platform's rich-text editing
    /// primitive, so editor frameworks keep their own state in sync.
    async fn insert_text(&mut self, el: ElementHandle, text: &str) -> Result<(), DomError>;

    /// Assign the value property of a form control.
    async fn set_value(&mut self, el: ElementHandle, value: &str) -> Result<(), DomError>;

    /// Fire a bubbling `input` notification on the element.
    async fn dispatch_input(&mut self, el: ElementHandle) -> Result<(), DomError>;

    /// Attach local files to a file input.
    async fn set_input_files(
        &mut self,
        _el: ElementHandle,
        _files: &[PathBuf],
    ) -> Result<(), DomError> {
        Err(DomError::NotSupported("set_input_files".into()))
    }
}

/// Walk `levels` parents up from `el`, stopping early at the root.
pub async fn ancestor<P: Page + ?Sized>(
    page: &P,
    el: ElementHandle,
    levels: usize,
) -> Result<ElementHandle, DomError> {
    let mut current = el;
    for _ in 0..levels {
        match page.parent(current).await? {
            Some(p) => current = p,
            None => break,
        }
    }
    Ok(current)
}

/// Describe an element, mapping a stale handle to `None`.
pub async fn describe_if_attached<P: Page + ?Sized>(
    page: &P,
    el: ElementHandle,
) -> Result<Option<ElementInfo>, DomError> {
    match page.describe(el).await {
        Ok(info) => Ok(Some(info)),
        Err(e) if e.is_stale() => Ok(None),
        Err(e) => Err(e),
    }
}
