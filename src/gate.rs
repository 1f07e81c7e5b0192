//! The gate-click interaction: wait for a disabled button, wait for it to
//! enable, click it, wait for the navigation it triggers.
//!
//! The gate models a page that runs an asynchronous readiness or challenge
//! check before allowing interaction. Every wait here is a blocking await
//! with an explicit bound; there is no retry of any step.

use std::time::Duration;

use chromiumoxide::page::Page;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::{connection_lost, FetchError};

/// Base selector of the gate control.
pub const GATE_SELECTOR: &str = ".btn";
/// Gate present but not yet interactable.
pub const GATE_SELECTOR_DISABLED: &str = ".btn[disabled]";
/// Gate ready to click.
pub const GATE_SELECTOR_ENABLED: &str = ".btn:not([disabled])";

/// Bound on explicit page loads (initial navigation and the html-dump re-navigation).
pub const NAV_TIMEOUT: Duration = Duration::from_secs(15);
/// Default window for selector waits and the post-click navigation.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Load `url`, bounded by [`NAV_TIMEOUT`]. The page counts as ready once the
/// document is available; full subresource load is not awaited.
pub async fn navigate(page: &Page, url: &str) -> Result<(), FetchError> {
    debug!(%url, "navigating");
    match timeout(NAV_TIMEOUT, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(FetchError::NavigationError {
            url: url.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(FetchError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: NAV_TIMEOUT.as_millis() as u64,
        }),
    }
}

/// Poll until an element matching `selector` exists in the DOM.
///
/// chromiumoxide has no built-in selector wait, so this is the polled
/// equivalent, bounded by `window`.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    window: Duration,
) -> Result<(), FetchError> {
    let start = Instant::now();
    loop {
        match page.find_element(selector).await {
            Ok(_) => {
                debug!(%selector, elapsed_ms = start.elapsed().as_millis() as u64, "selector matched");
                return Ok(());
            }
            // A dead transport would otherwise masquerade as a selector that
            // never matched.
            Err(e) if connection_lost(&e) => return Err(FetchError::Cdp(e)),
            Err(_) => {}
        }
        if start.elapsed() >= window {
            return Err(FetchError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: window.as_millis() as u64,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait for the gate to appear disabled, wait for it to enable, click it,
/// then wait for the navigation the click triggers. Each phase is bounded by
/// `window` independently.
pub async fn pass_gate(page: &Page, window: Duration) -> Result<(), FetchError> {
    wait_for_selector(page, GATE_SELECTOR_DISABLED, window).await?;
    wait_for_selector(page, GATE_SELECTOR_ENABLED, window).await?;

    let element =
        page.find_element(GATE_SELECTOR)
            .await
            .map_err(|e| FetchError::ElementNotInteractable {
                selector: GATE_SELECTOR.to_string(),
                reason: e.to_string(),
            })?;
    element
        .click()
        .await
        .map_err(|e| FetchError::ElementNotInteractable {
            selector: GATE_SELECTOR.to_string(),
            reason: e.to_string(),
        })?;
    debug!("gate clicked, awaiting navigation");

    match timeout(window, page.wait_for_navigation()).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(FetchError::NavigationError {
            url: String::from("(post-click)"),
            reason: e.to_string(),
        }),
        Err(_) => Err(FetchError::NavigationTimeout {
            url: String::from("(post-click)"),
            timeout_ms: window.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_selector_excludes_disabled_gate() {
        // The two wait phases must be mutually exclusive on the disabled attribute.
        assert_eq!(GATE_SELECTOR_DISABLED, ".btn[disabled]");
        assert_eq!(GATE_SELECTOR_ENABLED, ".btn:not([disabled])");
        assert!(GATE_SELECTOR_DISABLED.starts_with(GATE_SELECTOR));
        assert!(GATE_SELECTOR_ENABLED.starts_with(GATE_SELECTOR));
    }

    #[test]
    fn explicit_navigation_bound_is_fifteen_seconds() {
        assert_eq!(NAV_TIMEOUT, Duration::from_secs(15));
        assert_eq!(DEFAULT_WAIT, Duration::from_secs(30));
    }
}
