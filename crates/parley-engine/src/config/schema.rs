use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub timings: TimingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl ParleyConfig {
    /// Default search settings with every wait disabled.
    pub fn immediate() -> Self {
        Self {
            timings: TimingConfig::immediate(),
            search: SearchConfig::default(),
        }
    }
}

/// Named waits between steps. Zero disables a wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Before the first lookup, so the host page finishes its own rendering.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// After clicking the reply affordance.
    #[serde(default = "default_post_click_ms")]
    pub post_click_ms: u64,
    #[serde(default = "default_mention_poll_interval_ms")]
    pub mention_poll_interval_ms: u64,
    #[serde(default = "default_mention_poll_attempts")]
    pub mention_poll_attempts: usize,
    #[serde(default = "default_post_insert_ms")]
    pub post_insert_ms: u64,
    #[serde(default = "default_post_upload_ms")]
    pub post_upload_ms: u64,
    /// Between pressing Enter and checking whether the input was cleared.
    #[serde(default = "default_submit_check_ms")]
    pub submit_check_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            post_click_ms: default_post_click_ms(),
            mention_poll_interval_ms: default_mention_poll_interval_ms(),
            mention_poll_attempts: default_mention_poll_attempts(),
            post_insert_ms: default_post_insert_ms(),
            post_upload_ms: default_post_upload_ms(),
            submit_check_ms: default_submit_check_ms(),
        }
    }
}

impl TimingConfig {
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            post_click_ms: 0,
            mention_poll_interval_ms: 0,
            mention_poll_attempts: default_mention_poll_attempts(),
            post_insert_ms: 0,
            post_upload_ms: 0,
            submit_check_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn post_click(&self) -> Duration {
        Duration::from_millis(self.post_click_ms)
    }

    pub fn mention_poll_interval(&self) -> Duration {
        Duration::from_millis(self.mention_poll_interval_ms)
    }

    pub fn post_insert(&self) -> Duration {
        Duration::from_millis(self.post_insert_ms)
    }

    pub fn post_upload(&self) -> Duration {
        Duration::from_millis(self.post_upload_ms)
    }

    pub fn submit_check(&self) -> Duration {
        Duration::from_millis(self.submit_check_ms)
    }
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_post_click_ms() -> u64 {
    1500
}

fn default_mention_poll_interval_ms() -> u64 {
    500
}

fn default_mention_poll_attempts() -> usize {
    3
}

fn default_post_insert_ms() -> u64 {
    500
}

fn default_post_upload_ms() -> u64 {
    1500
}

fn default_submit_check_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Vertical margin around the container when the reply affordance is
    /// searched document-wide.
    #[serde(default = "default_reply_window_px")]
    pub reply_window_px: f32,
    /// How far above the container the scoped input search starts.
    #[serde(default = "default_input_ancestor_levels")]
    pub input_ancestor_levels: usize,
    /// Ancestor chain length searched for a submit control when the input has
    /// no enclosing form.
    #[serde(default = "default_submit_ancestor_levels")]
    pub submit_ancestor_levels: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            reply_window_px: default_reply_window_px(),
            input_ancestor_levels: default_input_ancestor_levels(),
            submit_ancestor_levels: default_submit_ancestor_levels(),
        }
    }
}

fn default_reply_window_px() -> f32 {
    400.0
}

fn default_input_ancestor_levels() -> usize {
    3
}

fn default_submit_ancestor_levels() -> usize {
    6
}
