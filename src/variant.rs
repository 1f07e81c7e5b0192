//! The four output-producing behaviors layered on the shared gate routine.
//!
//! The original tooling shipped one near-duplicate script per behavior; here
//! each is a [`Variant`] carrying its own input payload, and the session
//! policy (evasion on/off, identity overrides) is derived from it in one
//! place.

use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam};

use crate::error::FetchError;

/// What to produce after the gate has been passed.
#[derive(Debug, Clone)]
pub enum Variant {
    /// Navigate to a second page and dump its full markup.
    HtmlDump { page_url: String },
    /// GET a file from within the page's own script context.
    FetchFile { file_url: String },
    /// Same, but with a caller-supplied identity instead of the evasion layer.
    FetchFileAuthenticated {
        file_url: String,
        user_agent: String,
        cookies: Vec<CookieParam>,
    },
    /// Read the cookie jar visible to the page.
    CookieDump { user_agent: String },
    /// Capture the first network response whose URL contains the fragment.
    ResponseCapture { url_fragment: String },
}

impl Variant {
    /// Whether the session browses arbitrary third-party pages and therefore
    /// gets the evasion layer. Cookie retrieval and authenticated fetches
    /// target a trusted host (or replace evasion with explicit identity
    /// spoofing) and use a plain session.
    pub fn wants_stealth(&self) -> bool {
        match self {
            Variant::HtmlDump { .. }
            | Variant::FetchFile { .. }
            | Variant::ResponseCapture { .. } => true,
            Variant::FetchFileAuthenticated { .. } | Variant::CookieDump { .. } => false,
        }
    }

    /// User-agent override to apply before the first navigation, if any.
    pub fn user_agent(&self) -> Option<&str> {
        match self {
            Variant::FetchFileAuthenticated { user_agent, .. }
            | Variant::CookieDump { user_agent } => Some(user_agent),
            _ => None,
        }
    }

    /// Cookies to seed before the first navigation.
    pub fn seed_cookies(&self) -> &[CookieParam] {
        match self {
            Variant::FetchFileAuthenticated { cookies, .. } => cookies,
            _ => &[],
        }
    }
}

/// Parse the `cookie_json` CLI argument into CDP cookie parameters.
///
/// The argument is a JSON array of objects in CDP `CookieParam` shape
/// (`name`, `value`, and optionally `url`/`domain`/`path`/`httpOnly`/...).
pub fn parse_cookie_arg(raw: &str) -> Result<Vec<CookieParam>, FetchError> {
    serde_json::from_str(raw).map_err(FetchError::MalformedInput)
}

/// The one payload a successful run writes to stdout.
#[derive(Debug)]
pub enum Output {
    Html(String),
    Text(String),
    Json(serde_json::Value),
    Cookies(Vec<Cookie>),
}

impl Output {
    /// Serialize for stdout. HTML and fetched text pass through verbatim;
    /// JSON and cookies are compact-serialized.
    pub fn render(&self) -> serde_json::Result<String> {
        match self {
            Output::Html(html) => Ok(html.clone()),
            Output::Text(text) => Ok(text.clone()),
            Output::Json(value) => serde_json::to_string(value),
            Output::Cookies(cookies) => serde_json::to_string(cookies),
        }
    }
}
