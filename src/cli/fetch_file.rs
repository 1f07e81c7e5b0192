//! `gatefetch fetch-file` — gate-click, then GET a file from inside the page.
//!
//! With the two trailing identity arguments this becomes the authenticated
//! variant: the given user agent and cookie jar are applied before the first
//! navigation and the evasion layer is skipped.

use anyhow::Result;

use crate::fetch::{self, FetchPlan};
use crate::variant::{self, Variant};

pub async fn run(
    exec_path: &str,
    page_url: &str,
    file_url: &str,
    identity: Option<(&str, &str)>,
) -> Result<()> {
    let variant = match identity {
        // Cookie JSON is validated before any browser launches.
        Some((user_agent, cookie_json)) => Variant::FetchFileAuthenticated {
            file_url: file_url.to_string(),
            user_agent: user_agent.to_string(),
            cookies: variant::parse_cookie_arg(cookie_json)?,
        },
        None => Variant::FetchFile {
            file_url: file_url.to_string(),
        },
    };

    let plan = FetchPlan::new(exec_path, page_url, variant);
    let output = fetch::run(&plan).await?;
    println!("{}", output.render()?);
    Ok(())
}
