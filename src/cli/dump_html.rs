//! `gatefetch dump-html` — gate-click on the host page, then dump the target
//! page's full markup.

use anyhow::Result;

use crate::fetch::{self, FetchPlan};
use crate::variant::Variant;

pub async fn run(exec_path: &str, host_url: &str, page_url: &str) -> Result<()> {
    let plan = FetchPlan::new(
        exec_path,
        host_url,
        Variant::HtmlDump {
            page_url: page_url.to_string(),
        },
    );
    let output = fetch::run(&plan).await?;
    println!("{}", output.render()?);
    Ok(())
}
