//! Post-news command handler.

use anyhow::Result;

use tanksync_core::{NewsItem, wall_clock_ms};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Post one news item, published now.
///
/// Duplicate `(title, source)` pairs are reported, not treated as errors.
pub async fn execute(
    ctx: &CliContext,
    title: &str,
    source: &str,
    content: Option<String>,
    url: Option<String>,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CliError::Arguments("title must not be empty".to_string()).into());
    }

    let mut item = NewsItem::new(title, source).published(wall_clock_ms());
    if let Some(content) = content {
        item = item.with_content(content);
    }
    if let Some(url) = url {
        item = item.with_url(url);
    }

    let inserted = ctx
        .facade()
        .save_news(vec![item])
        .await
        .map_err(CliError::from)?;

    if inserted == 0 {
        println!("Already posted: \"{}\" ({source})", title.trim());
    } else {
        println!("Posted: \"{}\" ({source})", title.trim());
    }
    Ok(())
}
