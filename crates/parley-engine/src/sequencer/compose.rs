use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// A mention is already in the box: caret to the end, then append.
    AppendAfterMention,
    /// Replace whatever is in the box with our own mention and the message.
    ReplaceWithMention,
    /// No mention at all.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub mode: InsertMode,
    /// Text handed to the insertion primitive.
    pub text: String,
}

/// Decide what to type. An existing mention always wins over a synthesized
/// one so the author is never mentioned twice.
pub fn compose(message: &str, mention_present: bool, manual_mention: Option<&str>) -> Composition {
    if mention_present {
        return Composition {
            mode: InsertMode::AppendAfterMention,
            text: format!(" {}", message),
        };
    }
    match manual_mention {
        Some(mention) => Composition {
            mode: InsertMode::ReplaceWithMention,
            text: format!("{}{}", mention, message),
        },
        None => Composition {
            mode: InsertMode::Plain,
            text: message.to_string(),
        },
    }
}
