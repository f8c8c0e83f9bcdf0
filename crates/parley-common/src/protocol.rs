use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Opaque handle to a live element, issued by a `Page` implementation.
///
/// Handles are only meaningful for the page that issued them and may go stale
/// whenever the host page re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u32);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A reply job as delivered by the messaging layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyJob {
    pub message: String,
    #[serde(default)]
    pub steps: ReplySteps,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<PathBuf>,
}

impl ReplyJob {
    pub fn new(message: impl Into<String>, steps: ReplySteps) -> Self {
        Self {
            message: message.into(),
            steps,
            images: Vec::new(),
        }
    }
}

/// Which phases of the reply sequence should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySteps {
    #[serde(default)]
    pub click_reply: bool,
    #[serde(default)]
    pub input_text: bool,
    #[serde(default)]
    pub upload_images: bool,
    #[serde(default)]
    pub submit_reply: bool,
}

impl ReplySteps {
    /// Open the reply box, type, and submit. Image upload stays off.
    pub fn full_reply() -> Self {
        Self {
            click_reply: true,
            input_text: true,
            upload_images: false,
            submit_reply: true,
        }
    }

    pub fn needs_input(&self) -> bool {
        self.input_text || self.submit_reply
    }
}

/// Terminal result of one automation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplyOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when this rect lies entirely between `top` and `bottom`.
    pub fn within_band(&self, top: f32, bottom: f32) -> bool {
        self.y >= top && self.bottom() <= bottom
    }
}

/// Point-in-time description of an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInfo {
    pub handle: ElementHandle,
    pub tag: String,
    /// Rendered text, whitespace-collapsed. For editable regions this is the
    /// current content.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub rect: Rect,
    #[serde(default)]
    pub visible: bool,
    /// `contenteditable` region (as opposed to a form control).
    #[serde(default)]
    pub rich_text: bool,
    /// Current value of a form control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ElementInfo {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn href(&self) -> Option<&str> {
        self.attr("href")
    }

    pub fn aria_label(&self) -> Option<&str> {
        self.attr("aria-label")
    }

    /// What a user would read in this element: the value of a form control,
    /// otherwise its text.
    pub fn content(&self) -> &str {
        match &self.value {
            Some(v) if !self.rich_text => v,
            _ => &self.text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// DOM `MouseEvent.button` value.
    pub fn index(&self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    MouseDown,
    MouseUp,
    Click,
}

impl PointerEventKind {
    pub fn event_type(&self) -> &'static str {
        match self {
            PointerEventKind::MouseDown => "mousedown",
            PointerEventKind::MouseUp => "mouseup",
            PointerEventKind::Click => "click",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub client_x: f32,
    pub client_y: f32,
    #[serde(default)]
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
}

impl KeyEventKind {
    pub fn event_type(&self) -> &'static str {
        match self {
            KeyEventKind::KeyDown => "keydown",
            KeyEventKind::KeyUp => "keyup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: String,
    pub code: String,
    pub key_code: u32,
}

impl KeyEvent {
    pub fn enter(kind: KeyEventKind) -> Self {
        Self {
            kind,
            key: "Enter".into(),
            code: "Enter".into(),
            key_code: 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_use_camel_case_on_the_wire() {
        let job: ReplyJob = serde_json::from_str(
            r#"{"message":"hi","steps":{"clickReply":true,"inputText":true,"uploadImages":false,"submitReply":false}}"#,
        )
        .unwrap();
        assert!(job.steps.click_reply);
        assert!(job.steps.input_text);
        assert!(!job.steps.submit_reply);
        assert!(job.images.is_empty());
    }

    #[test]
    fn outcome_omits_error_on_success() {
        let json = serde_json::to_string(&ReplyOutcome::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_string(&ReplyOutcome::failed("boom")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }

    #[test]
    fn rect_center_and_band() {
        let r = Rect::new(10.0, 100.0, 40.0, 20.0);
        assert_eq!(r.center(), (30.0, 110.0));
        assert!(r.within_band(50.0, 150.0));
        assert!(!r.within_band(105.0, 150.0));
    }
}
