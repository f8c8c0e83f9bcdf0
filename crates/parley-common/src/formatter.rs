use crate::protocol::{ElementInfo, ReplyOutcome};

const MAX_TEXT_PREVIEW: usize = 40;

pub fn format_outcome(outcome: &ReplyOutcome) -> String {
    if outcome.success {
        return "ok".to_string();
    }
    match &outcome.error {
        Some(err) => format!("failed: {}", err),
        None => "failed".to_string(),
    }
}

/// One-line description of an element, e.g. `#12 div[role=article] "Jane Doe 3h"`.
pub fn format_element(el: &ElementInfo) -> String {
    let mut out = format!("{} {}", el.handle, el.tag);
    if let Some(role) = el.attr("role") {
        out.push_str(&format!("[role={}]", role));
    }

    let preview = preview(el.content());
    if !preview.is_empty() {
        out.push_str(&format!(" {:?}", preview));
    }
    if !el.visible {
        out.push_str(" {hidden}");
    }
    out
}

fn preview(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_TEXT_PREVIEW).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ElementHandle, Rect};
    use std::collections::HashMap;

    #[test]
    fn formats_element_with_role_and_preview() {
        let el = ElementInfo {
            handle: ElementHandle(7),
            tag: "div".into(),
            text: "a".repeat(50),
            attributes: HashMap::from([("role".to_string(), "article".to_string())]),
            rect: Rect::default(),
            visible: false,
            rich_text: false,
            value: None,
        };
        let line = format_element(&el);
        assert!(line.starts_with("#7 div[role=article] \""));
        assert!(line.contains('…'));
        assert!(line.ends_with("{hidden}"));
    }

    #[test]
    fn formats_outcomes() {
        assert_eq!(format_outcome(&ReplyOutcome::ok()), "ok");
        assert_eq!(
            format_outcome(&ReplyOutcome::failed("Could not find comment input")),
            "failed: Could not find comment input"
        );
    }
}
