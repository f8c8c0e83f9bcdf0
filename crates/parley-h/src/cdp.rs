//! Chromium process and tab ownership.
//!
//! One browser, one tab. Replies are posted as whoever the profile is logged
//! in as, so a persistent profile is the normal production setup and the
//! throwaway profile exists for tests and dry experiments.

use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use parley_common::error::DomError;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const CHROME_BIN_VAR: &str = "CHROME_BIN";
const USER_DATA_DIR_VAR: &str = "PARLEY_USER_DATA_DIR";

/// Where the browser keeps cookies and session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    /// Kept across runs, typically holding the logged-in session.
    Persistent(PathBuf),
    /// Created for this run and removed on close.
    Throwaway(PathBuf),
}

impl Profile {
    pub fn path(&self) -> &Path {
        match self {
            Profile::Persistent(path) | Profile::Throwaway(path) => path,
        }
    }

    fn throwaway() -> Result<Self, DomError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DomError::Other(format!("System clock error: {}", e)))?
            .as_nanos();
        let name = format!("parley-profile-{}-{}", std::process::id(), nanos);
        Ok(Profile::Throwaway(std::env::temp_dir().join(name)))
    }

    fn discard(&self) {
        if let Profile::Throwaway(path) = self
            && let Err(e) = std::fs::remove_dir_all(path)
        {
            debug!("Could not remove profile {}: {}", path.display(), e);
        }
    }
}

/// How to start Chromium.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub visible: bool,
    pub executable: Option<PathBuf>,
    pub profile: Profile,
}

impl LaunchOptions {
    /// Options from `CHROME_BIN` and `PARLEY_USER_DATA_DIR`.
    pub fn from_env(visible: bool) -> Result<Self, DomError> {
        Self::from_vars(visible, |name| std::env::var(name).ok())
    }

    fn from_vars(
        visible: bool,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomError> {
        let profile = match var(USER_DATA_DIR_VAR).filter(|v| !v.is_empty()) {
            Some(dir) => Profile::Persistent(PathBuf::from(dir)),
            None => Profile::throwaway()?,
        };
        Ok(Self {
            visible,
            executable: var(CHROME_BIN_VAR).filter(|v| !v.is_empty()).map(PathBuf::from),
            profile,
        })
    }

    fn browser_config(&self) -> Result<BrowserConfig, DomError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(self.profile.path());
        if self.visible {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        builder
            .build()
            .map_err(|e| DomError::Other(format!("Invalid browser config: {}", e)))
    }
}

pub struct CdpClient {
    pub browser: Browser,
    pub page: Page,
    events: JoinHandle<()>,
    profile: Profile,
}

impl CdpClient {
    pub async fn launch(options: LaunchOptions) -> Result<Self, DomError> {
        std::fs::create_dir_all(options.profile.path())
            .map_err(|e| DomError::Other(format!("Cannot create profile dir: {}", e)))?;
        info!(
            "Starting Chromium ({}, profile {:?})",
            if options.visible { "visible" } else { "headless" },
            options.profile
        );

        let (browser, mut handler) = Browser::launch(options.browser_config()?)
            .await
            .map_err(|e| DomError::Other(format!("Chromium did not start: {}", e)))?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP event error: {}", e);
                }
            }
            debug!("CDP connection closed");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DomError::Other(format!("Cannot open tab: {}", e)))?;
        accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            page,
            events,
            profile: options.profile,
        })
    }

    pub async fn close(mut self) -> Result<(), DomError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DomError::Other(format!("Chromium did not close: {}", e)));
        if let Err(e) = self.events.await {
            warn!("CDP event task ended abnormally: {}", e);
        }
        self.profile.discard();
        closed
    }
}

/// A pending alert or confirm freezes the page's JS thread, and with it every
/// bridge call, so each one is accepted as soon as it opens.
async fn accept_dialogs(page: &Page) -> Result<(), DomError> {
    let mut dialogs = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| DomError::Other(format!("Cannot watch dialogs: {}", e)))?;
    let page = page.clone();
    tokio::spawn(async move {
        while let Some(dialog) = dialogs.next().await {
            info!("Accepting {:?} dialog: {}", dialog.r#type, dialog.message);
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                warn!("Dialog could not be accepted: {}", e);
            }
        }
    });
    Ok(())
}
