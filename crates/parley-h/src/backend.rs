use crate::bridge::{self, call};
use crate::cdp::{CdpClient, LaunchOptions};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use parley_engine::page::{DomError, Page};
use parley_engine::protocol::{ElementHandle, ElementInfo, KeyEvent, PointerEvent};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::info;

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            client: None,
            visible: false,
        }
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    pub async fn launch(&mut self) -> Result<(), DomError> {
        let options = LaunchOptions::from_env(self.visible)?;
        self.client = Some(CdpClient::launch(options).await?);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), DomError> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }

    /// Navigate and wait for the load event. Returns the final address.
    pub async fn navigate(&mut self, url: &str) -> Result<String, DomError> {
        let client = self.client.as_mut().ok_or(DomError::NotReady)?;

        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| DomError::Other(format!("Navigation failed: {}", e)))?;

        Ok(client
            .page
            .url()
            .await
            .map_err(|e| DomError::Other(e.to_string()))?
            .unwrap_or_else(|| url.to_string()))
    }

    /// The current tab as a `Page` the engine can drive.
    pub fn page(&self) -> Result<HeadlessPage, DomError> {
        let client = self.client.as_ref().ok_or(DomError::NotReady)?;
        Ok(HeadlessPage {
            page: client.page.clone(),
        })
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// A live Chromium tab. Every call goes through the injected bridge, so
/// nothing is cached between calls.
#[derive(Clone)]
pub struct HeadlessPage {
    page: chromiumoxide::Page,
}

impl HeadlessPage {
    async fn call_as<T: DeserializeOwned>(&self, op: &str, args: Value) -> Result<T, DomError> {
        let value = call(&self.page, op, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn act(&self, op: &str, args: Value) -> Result<(), DomError> {
        call(&self.page, op, args).await.map(|_| ())
    }
}

#[async_trait]
impl Page for HeadlessPage {
    async fn current_url(&self) -> Result<String, DomError> {
        self.call_as("url", json!({})).await
    }

    async fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DomError> {
        self.call_as(
            "query_all",
            json!({ "scope": scope.map(|s| s.0), "selector": selector }),
        )
        .await
    }

    async fn closest(
        &self,
        el: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DomError> {
        self.call_as("closest", json!({ "el": el.0, "selector": selector }))
            .await
    }

    async fn parent(&self, el: ElementHandle) -> Result<Option<ElementHandle>, DomError> {
        self.call_as("parent", json!({ "el": el.0 })).await
    }

    async fn describe(&self, el: ElementHandle) -> Result<ElementInfo, DomError> {
        self.call_as("describe", json!({ "el": el.0 })).await
    }

    async fn depth(&self, el: ElementHandle) -> Result<usize, DomError> {
        self.call_as("depth", json!({ "el": el.0 })).await
    }

    async fn dispatch_pointer(
        &mut self,
        el: ElementHandle,
        event: PointerEvent,
    ) -> Result<(), DomError> {
        self.act(
            "pointer",
            json!({
                "el": el.0,
                "kind": event.kind.event_type(),
                "client_x": event.client_x,
                "client_y": event.client_y,
                "button": event.button.index(),
            }),
        )
        .await
    }

    async fn dispatch_key(&mut self, el: ElementHandle, event: KeyEvent) -> Result<(), DomError> {
        self.act(
            "key",
            json!({
                "el": el.0,
                "kind": event.kind.event_type(),
                "key": event.key,
                "code": event.code,
                "key_code": event.key_code,
            }),
        )
        .await
    }

    async fn focus(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.act("focus", json!({ "el": el.0 })).await
    }

    async fn move_caret_to_end(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.act("caret_end", json!({ "el": el.0 })).await
    }

    async fn clear_content(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.act("clear", json!({ "el": el.0 })).await
    }

    async fn insert_text(&mut self, el: ElementHandle, text: &str) -> Result<(), DomError> {
        self.act("insert_text", json!({ "el": el.0, "text": text }))
            .await
    }

    async fn set_value(&mut self, el: ElementHandle, value: &str) -> Result<(), DomError> {
        self.act("set_value", json!({ "el": el.0, "value": value }))
            .await
    }

    async fn dispatch_input(&mut self, el: ElementHandle) -> Result<(), DomError> {
        self.act("input", json!({ "el": el.0 })).await
    }

    async fn set_input_files(
        &mut self,
        el: ElementHandle,
        files: &[PathBuf],
    ) -> Result<(), DomError> {
        let object_id = bridge::object_id(&self.page, el).await?;
        let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        let params = SetFileInputFilesParams::builder()
            .files(files)
            .object_id(object_id)
            .build()
            .map_err(DomError::Other)?;

        self.page
            .execute(params)
            .await
            .map_err(|e| DomError::Other(format!("setFileInputFiles failed: {}", e)))?;
        Ok(())
    }
}
