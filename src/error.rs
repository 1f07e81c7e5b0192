//! Error taxonomy for the gated-navigation fetch flow.
//!
//! Nothing here is caught or retried internally; every variant propagates to
//! the binary entry point, which prints the chain to stderr and exits 1.

use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("navigation to {url} failed: {reason}")]
    NavigationError { url: String, reason: String },

    #[error("selector {selector:?} did not match within {timeout_ms}ms")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("gate element {selector:?} is not clickable: {reason}")]
    ElementNotInteractable { selector: String, reason: String },

    #[error("no response with URL containing {fragment:?} observed within {timeout_ms}ms")]
    ResponseNotObserved { fragment: String, timeout_ms: u64 },

    #[error("captured response body is not valid JSON")]
    ResponseDecode(#[source] serde_json::Error),

    #[error("malformed cookie JSON argument")]
    MalformedInput(#[source] serde_json::Error),

    #[error("in-page script evaluation failed: {0}")]
    Script(String),

    /// CDP transport or protocol failure outside the named states above.
    #[error(transparent)]
    Cdp(#[from] CdpError),
}

/// Whether a CDP error means the browser connection is gone, as opposed to a
/// query that merely found nothing (yet). Polling loops must surface the
/// former immediately instead of burning their whole wait window on a dead
/// transport.
pub fn connection_lost(e: &CdpError) -> bool {
    matches!(
        e,
        CdpError::Ws(_) | CdpError::Io(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_timeout_names_url_and_bound() {
        let err = FetchError::NavigationTimeout {
            url: "https://example.test/gate".into(),
            timeout_ms: 15_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.test/gate"));
        assert!(msg.contains("15000ms"));
    }

    #[test]
    fn selector_timeout_quotes_selector() {
        let err = FetchError::SelectorTimeout {
            selector: ".btn[disabled]".into(),
            timeout_ms: 30_000,
        };
        assert!(err.to_string().contains("\".btn[disabled]\""));
    }

    #[test]
    fn lost_transport_is_not_a_missing_element() {
        assert!(connection_lost(&CdpError::NoResponse));
        // A selector that matches nothing must stay retryable.
        assert!(!connection_lost(&CdpError::NotFound));
        assert!(!connection_lost(&CdpError::Timeout));
    }

    #[test]
    fn malformed_input_keeps_source() {
        let source = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err = FetchError::MalformedInput(source);
        assert!(std::error::Error::source(&err).is_some());
    }
}
