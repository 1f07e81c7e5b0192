//! `gatefetch get-cookie` — gate-click, then dump the cookie jar as JSON.
//!
//! Uses a plain session (no evasion layer); cookie retrieval targets a
//! trusted host and carries an explicit user agent instead.

use anyhow::Result;

use crate::fetch::{self, FetchPlan};
use crate::variant::Variant;

pub async fn run(exec_path: &str, url: &str, user_agent: &str) -> Result<()> {
    let plan = FetchPlan::new(
        exec_path,
        url,
        Variant::CookieDump {
            user_agent: user_agent.to_string(),
        },
    );
    let output = fetch::run(&plan).await?;
    println!("{}", output.render()?);
    Ok(())
}
