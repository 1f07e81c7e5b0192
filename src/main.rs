// Copyright 2026 Gatefetch Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};

use gatefetch::cli;

#[derive(Parser)]
#[command(
    name = "gatefetch",
    about = "Gate-click navigation fetcher for headless Chromium",
    version,
    after_help = "Every command needs the path to a Chromium executable as its first argument."
)]
#[derive(Debug)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress non-error logging
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Gate-click on a host page, then dump a target page's full HTML
    DumpHtml {
        /// Path to the Chromium executable
        exec_path: String,
        /// Page carrying the gate element
        host_url: String,
        /// Page whose markup is dumped after the gate is passed
        page_url: String,
    },
    /// Gate-click, then GET a file from inside the page and print its body
    FetchFile {
        /// Path to the Chromium executable
        exec_path: String,
        /// Page carrying the gate element
        page_url: String,
        /// File address fetched from the page's script context
        file_url: String,
        /// User-agent override (authenticated variant; requires COOKIE_JSON)
        #[arg(requires = "cookie_json")]
        user_agent: Option<String>,
        /// JSON array of cookies seeded before navigation
        #[arg(requires = "user_agent")]
        cookie_json: Option<String>,
    },
    /// Gate-click, then print the page's cookie jar as a JSON array
    GetCookie {
        /// Path to the Chromium executable
        exec_path: String,
        /// Page carrying the gate element
        url: String,
        /// User-agent override applied before navigation
        user_agent: String,
    },
    /// Gate-click, then print the JSON body of the first matching response
    GetResponse {
        /// Path to the Chromium executable
        exec_path: String,
        /// Substring matched against observed response URLs
        url_fragment: String,
        /// Page carrying the gate element
        page_url: String,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "gatefetch=error"
    } else if verbose {
        "gatefetch=debug"
    } else {
        "gatefetch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::DumpHtml {
            exec_path,
            host_url,
            page_url,
        } => cli::dump_html::run(exec_path, host_url, page_url).await,
        Commands::FetchFile {
            exec_path,
            page_url,
            file_url,
            user_agent,
            cookie_json,
        } => {
            let identity = user_agent
                .as_deref()
                .zip(cookie_json.as_deref());
            cli::fetch_file::run(exec_path, page_url, file_url, identity).await
        }
        Commands::GetCookie {
            exec_path,
            url,
            user_agent,
        } => cli::get_cookie::run(exec_path, url, user_agent).await,
        Commands::GetResponse {
            exec_path,
            url_fragment,
            page_url,
        } => cli::get_response::run(exec_path, url_fragment, page_url).await,
    };

    // No partial-success output: either the payload was printed, or the
    // failure goes to stderr and the exit status is non-zero.
    if let Err(e) = result {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn dump_html_takes_three_positionals() {
        let cli = Cli::try_parse_from([
            "gatefetch",
            "dump-html",
            "/usr/bin/chromium",
            "https://example.test/gate",
            "https://example.test/content",
        ])
        .unwrap();
        match cli.command {
            Commands::DumpHtml {
                exec_path,
                host_url,
                page_url,
            } => {
                assert_eq!(exec_path, "/usr/bin/chromium");
                assert_eq!(host_url, "https://example.test/gate");
                assert_eq!(page_url, "https://example.test/content");
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn fetch_file_identity_args_require_each_other() {
        let err = Cli::try_parse_from([
            "gatefetch",
            "fetch-file",
            "/usr/bin/chromium",
            "https://example.test/gate",
            "https://example.test/file.txt",
            "Mozilla/5.0",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn fetch_file_accepts_full_identity() {
        let cli = Cli::try_parse_from([
            "gatefetch",
            "fetch-file",
            "/usr/bin/chromium",
            "https://example.test/gate",
            "https://example.test/file.txt",
            "Mozilla/5.0",
            r#"[{"name":"sid","value":"abc"}]"#,
        ])
        .unwrap();
        match cli.command {
            Commands::FetchFile {
                user_agent,
                cookie_json,
                ..
            } => {
                assert_eq!(user_agent.as_deref(), Some("Mozilla/5.0"));
                assert!(cookie_json.unwrap().contains("sid"));
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn get_response_fragment_precedes_page_url() {
        let cli = Cli::try_parse_from([
            "gatefetch",
            "get-response",
            "/usr/bin/chromium",
            "/api/items",
            "https://example.test/gate",
        ])
        .unwrap();
        match cli.command {
            Commands::GetResponse {
                url_fragment,
                page_url,
                ..
            } => {
                assert_eq!(url_fragment, "/api/items");
                assert_eq!(page_url, "https://example.test/gate");
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
