//! The one shared routine: acquire a session, pass the gate, produce the
//! variant's output, release the session.

use std::path::PathBuf;

use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use tracing::info;

use crate::browser::{Session, SessionConfig};
use crate::error::FetchError;
use crate::variant::{Output, Variant};
use crate::{capture, gate};

/// Everything one invocation needs: where the browser lives, which page hosts
/// the gate, and what to produce afterwards.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub exec_path: PathBuf,
    /// The page carrying the gate element.
    pub target_url: String,
    pub variant: Variant,
}

impl FetchPlan {
    pub fn new(exec_path: impl Into<PathBuf>, target_url: impl Into<String>, variant: Variant) -> Self {
        Self {
            exec_path: exec_path.into(),
            target_url: target_url.into(),
            variant,
        }
    }

    /// Session policy derived from the variant: evasion for third-party
    /// browsing, explicit identity for the authenticated/cookie paths.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(&self.exec_path);
        config.stealth = self.variant.wants_stealth();
        config.user_agent = self.variant.user_agent().map(str::to_string);
        config.cookies = self.variant.seed_cookies().to_vec();
        config
    }
}

/// Run the full flow. The session is closed on both paths before the result
/// is returned, so a teardown failure can never mask the real outcome.
pub async fn run(plan: &FetchPlan) -> Result<Output, FetchError> {
    let session = Session::launch(&plan.session_config()).await?;
    let result = drive(&session.page, plan).await;
    session.close().await;
    result
}

async fn drive(page: &Page, plan: &FetchPlan) -> Result<Output, FetchError> {
    gate::navigate(page, &plan.target_url).await?;
    gate::pass_gate(page, gate::DEFAULT_WAIT).await?;
    info!(url = %plan.target_url, "gate passed");

    match &plan.variant {
        Variant::HtmlDump { page_url } => {
            gate::navigate(page, page_url).await?;
            let html = page.content().await?;
            Ok(Output::Html(html))
        }
        Variant::FetchFile { file_url }
        | Variant::FetchFileAuthenticated { file_url, .. } => {
            let body = fetch_in_page(page, file_url).await?;
            Ok(Output::Text(body))
        }
        Variant::CookieDump { .. } => {
            let cookies = page.get_cookies().await?;
            Ok(Output::Cookies(cookies))
        }
        Variant::ResponseCapture { url_fragment } => {
            let value = capture::first_json_response(page, url_fragment).await?;
            Ok(Output::Json(value))
        }
    }
}

/// GET a URL from within the page's own script context and return the body
/// text. Runs under the page's origin, cookies, and user agent.
async fn fetch_in_page(page: &Page, file_url: &str) -> Result<String, FetchError> {
    let expression = format!(
        "fetch({}, {{ method: 'GET' }}).then(r => r.text())",
        js_quote(file_url)
    );
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(FetchError::Script)?;

    let result = page.evaluate(params).await?;
    result
        .into_value()
        .map_err(|e| FetchError::Script(format!("fetch result was not text: {e}")))
}

/// Embed a Rust string as a JS string literal.
fn js_quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_quote_escapes_quotes_and_backslashes() {
        assert_eq!(js_quote("plain"), "\"plain\"");
        assert_eq!(js_quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn session_config_follows_variant_policy() {
        let plan = FetchPlan::new(
            "/usr/bin/chromium",
            "https://example.test/gate",
            Variant::FetchFileAuthenticated {
                file_url: "https://example.test/file.txt".into(),
                user_agent: "Mozilla/5.0 (custom)".into(),
                cookies: Vec::new(),
            },
        );
        let config = plan.session_config();
        assert!(!config.stealth);
        assert_eq!(config.user_agent.as_deref(), Some("Mozilla/5.0 (custom)"));

        let plan = FetchPlan::new(
            "/usr/bin/chromium",
            "https://example.test/gate",
            Variant::ResponseCapture {
                url_fragment: "/api/".into(),
            },
        );
        let config = plan.session_config();
        assert!(config.stealth);
        assert!(config.user_agent.is_none());
        assert!(config.cookies.is_empty());
    }
}
