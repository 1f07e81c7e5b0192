//! Session acquire/release: one headless Chromium process plus one page,
//! owned exclusively by the running invocation.

use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::stealth;

/// Launch-time configuration. The executable path is the only collaborator
/// surface; everything else is derived from the requested output variant.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub exec_path: PathBuf,
    /// Enable the automation-detection evasion layer.
    pub stealth: bool,
    /// User-agent override, applied before the first navigation.
    pub user_agent: Option<String>,
    /// Cookies seeded into the jar before the first navigation.
    pub cookies: Vec<CookieParam>,
}

impl SessionConfig {
    pub fn new(exec_path: impl Into<PathBuf>) -> Self {
        Self {
            exec_path: exec_path.into(),
            stealth: false,
            user_agent: None,
            cookies: Vec::new(),
        }
    }
}

/// One browser process + one page. Created at process start, destroyed at
/// process end, never shared.
pub struct Session {
    browser: Browser,
    pub page: Page,
    handler: JoinHandle<()>,
}

impl Session {
    /// Launch headless Chromium and open a blank page, applying the stealth
    /// layer and any identity overrides before the caller navigates anywhere.
    pub async fn launch(config: &SessionConfig) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&config.exec_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if config.stealth {
            for arg in stealth::LAUNCH_ARGS {
                builder = builder.arg(*arg);
            }
        }

        let browser_config = builder.build().map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // Drive the CDP event loop for the lifetime of the session.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        if config.stealth {
            stealth::prepare(&page).await?;
        }
        if let Some(ua) = &config.user_agent {
            debug!(user_agent = %ua, "applying user-agent override");
            page.set_user_agent(SetUserAgentOverrideParams::new(ua.clone()))
                .await?;
        }
        if !config.cookies.is_empty() {
            debug!(count = config.cookies.len(), "seeding cookie jar");
            page.set_cookies(config.cookies.clone()).await?;
        }

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Best-effort teardown. Runs on success and failure paths; a close
    /// failure must never mask the original error, so problems are only
    /// logged here.
    pub async fn close(mut self) {
        if let Err(e) = self.page.close().await {
            warn!("failed to close page: {e}");
        }
        if let Err(e) = self.browser.close().await {
            warn!("failed to close browser: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_plain_session() {
        let config = SessionConfig::new("/usr/bin/chromium");
        assert!(!config.stealth);
        assert!(config.user_agent.is_none());
        assert!(config.cookies.is_empty());
        assert_eq!(config.exec_path, PathBuf::from("/usr/bin/chromium"));
    }
}
