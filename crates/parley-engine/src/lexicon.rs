//! Localized labels and text patterns the heuristics match against.
//!
//! The host page is rendered in English or Vietnamese depending on the
//! account, so every label list carries both.

use regex::Regex;
use std::sync::LazyLock;

/// Text of the reply affordance under a comment.
pub const REPLY_LABELS: &[&str] = &["reply", "phản hồi", "trả lời"];

/// Action labels that appear as links next to a comment author.
pub const UI_ACTION_LABELS: &[&str] = &[
    "like",
    "reply",
    "share",
    "edit",
    "hide",
    "delete",
    "follow",
    "author",
    "top fan",
    "see translation",
    "thích",
    "phản hồi",
    "trả lời",
    "chia sẻ",
    "chỉnh sửa",
    "ẩn",
    "xóa",
    "theo dõi",
    "tác giả",
    "fan cứng",
    "xem bản dịch",
];

/// Accessible labels of a control that posts the comment.
pub const SUBMIT_LABELS: &[&str] = &[
    "comment",
    "post",
    "send",
    "submit",
    "reply",
    "bình luận",
    "đăng",
    "gửi",
    "phản hồi",
    "trả lời",
];

/// Controls in the composer that share submit-like labels but open pickers
/// or the commenter's profile.
pub const EXCLUDED_CONTROL_KEYWORDS: &[&str] = &[
    "avatar",
    "profile",
    "emoji",
    "sticker",
    "gif",
    "comment as",
    "ảnh đại diện",
    "trang cá nhân",
    "biểu tượng cảm xúc",
    "nhãn dán",
    "bình luận dưới tên",
];

static RELATIVE_TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)^(?:
            \d+\s*(?:
                s|sec|secs|second|seconds|
                m|min|mins|minute|minutes|
                h|hr|hrs|hour|hours|
                d|day|days|
                w|wk|wks|week|weeks|
                mo|month|months|
                y|yr|yrs|year|years|
                giây|phút|giờ|ngày|tuần|tháng|năm|
                j|sem|std|tg
            )(?:\s+(?:ago|trước))?
            |just\s+now|vừa\s+xong|yesterday|hôm\s+qua
        )$",
    )
    .unwrap()
});

static PROFILE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://[^/]+)?/(?:profile\.php\?id=\d+|people/[^/?#]+/\d+|[a-z0-9][a-z0-9._-]{2,})/?(?:[?#]|$)",
    )
    .unwrap()
});

/// Single-segment paths that look like usernames but are site sections.
const RESERVED_PATH_SEGMENTS: &[&str] = &[
    "watch",
    "reel",
    "reels",
    "hashtag",
    "events",
    "pages",
    "search",
    "groups",
    "photo",
    "photo.php",
    "story.php",
    "permalink.php",
    "home.php",
    "login",
    "notifications",
];

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 60;

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn is_relative_timestamp(text: &str) -> bool {
    RELATIVE_TIMESTAMP_RE.is_match(&normalize(text))
}

pub fn is_ui_action_label(text: &str) -> bool {
    let text = normalize(text);
    UI_ACTION_LABELS.contains(&text.as_str())
}

/// A reply affordance reads exactly "Reply", or starts with it ("Reply to
/// Jane's comment").
pub fn is_reply_label(text: &str) -> bool {
    let text = normalize(text);
    REPLY_LABELS
        .iter()
        .any(|label| text == *label || text.starts_with(&format!("{} ", label)))
}

pub fn is_submit_label(text: &str) -> bool {
    let text = normalize(text);
    SUBMIT_LABELS
        .iter()
        .any(|label| text == *label || text.starts_with(&format!("{} ", label)))
}

pub fn mentions_excluded_control(text: &str) -> bool {
    let text = normalize(text);
    EXCLUDED_CONTROL_KEYWORDS
        .iter()
        .any(|keyword| text.contains(keyword))
}

/// Text that could be a person's display name: 2–60 characters, at least one
/// letter in any script, and not a timestamp or an action label.
pub fn is_plausible_name(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len)
        && text.chars().any(char::is_alphabetic)
        && !is_relative_timestamp(text)
        && !is_ui_action_label(text)
}

pub fn href_references_comment(href: &str) -> bool {
    href.contains("comment_id=")
}

pub fn href_references_media(href: &str) -> bool {
    let lower = href.to_lowercase();
    ["/photo", "photo.php", "/photos/", "/video", "/videos/", "/watch", "/reel"]
        .iter()
        .any(|marker| lower.contains(marker))
}

pub fn is_profile_url(href: &str) -> bool {
    if href_references_comment(href) || href_references_media(href) {
        return false;
    }
    if !PROFILE_URL_RE.is_match(href) {
        return false;
    }
    let path = href
        .split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|i| &rest[i..]))
        .unwrap_or(href);
    let first_segment = path
        .trim_start_matches('/')
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    !RESERVED_PATH_SEGMENTS.contains(&first_segment.as_str())
}
