//! `gatefetch get-response` — gate-click, then print the JSON body of the
//! first network response whose URL contains the given fragment.

use anyhow::Result;

use crate::fetch::{self, FetchPlan};
use crate::variant::Variant;

pub async fn run(exec_path: &str, url_fragment: &str, page_url: &str) -> Result<()> {
    let plan = FetchPlan::new(
        exec_path,
        page_url,
        Variant::ResponseCapture {
            url_fragment: url_fragment.to_string(),
        },
    );
    let output = fetch::run(&plan).await?;
    println!("{}", output.render()?);
    Ok(())
}
