//! Automation-detection evasion for sessions that browse third-party pages.
//!
//! Two layers: launch arguments that stop Chromium advertising automation,
//! and an init script installed before any page script runs that clears the
//! tells detection scripts look for (`navigator.webdriver`, empty plugin and
//! language lists, a missing `window.chrome`).

use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use tracing::debug;

use crate::error::FetchError;

/// Extra launch arguments for evasion-enabled sessions.
pub const LAUNCH_ARGS: &[&str] = &["--disable-blink-features=AutomationControlled"];

/// Installed via `Page.addScriptToEvaluateOnNewDocument` so it runs on every
/// navigation before the page's own scripts.
const INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
if (navigator.plugins.length === 0) {
    Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3] });
}
if (navigator.languages.length === 0) {
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
}
if (!window.chrome) {
    window.chrome = { runtime: {} };
}
"#;

/// Install the evasion init script on a fresh page.
pub async fn prepare(page: &Page) -> Result<(), FetchError> {
    let params = AddScriptToEvaluateOnNewDocumentParams::builder()
        .source(INIT_SCRIPT)
        .build()
        .map_err(FetchError::Script)?;
    page.execute(params).await?;
    debug!("stealth init script installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_script_covers_known_tells() {
        assert!(INIT_SCRIPT.contains("webdriver"));
        assert!(INIT_SCRIPT.contains("plugins"));
        assert!(INIT_SCRIPT.contains("languages"));
        assert!(INIT_SCRIPT.contains("window.chrome"));
    }

    #[test]
    fn launch_args_disable_automation_blink_feature() {
        assert!(LAUNCH_ARGS
            .iter()
            .any(|a| a.contains("AutomationControlled")));
    }
}
