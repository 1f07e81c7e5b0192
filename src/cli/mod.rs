//! CLI subcommand implementations for the gatefetch binary.

pub mod dump_html;
pub mod fetch_file;
pub mod get_cookie;
pub mod get_response;
