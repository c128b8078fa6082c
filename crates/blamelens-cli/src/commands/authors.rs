//! Authors command implementation.

use super::{print_json, Context};
use anyhow::Result;
use blamelens_core::LineRange;
use colored::Colorize;
use std::path::Path;

/// Run the authors command.
pub async fn run(ctx: &Context, file: &Path, lines: Option<LineRange>) -> Result<()> {
    let Some(file_name) = ctx.tracked_file(file)? else {
        return Ok(());
    };

    let blame = match lines {
        Some(range) => ctx.service.get_blame_for_range(&file_name, range).await?,
        None => ctx.service.get_blame_for_file(&file_name).await?.for_file(),
    };

    if ctx.json {
        return print_json(&blame.authors);
    }

    let total = blame.lines.len().max(1) as f64;
    for (i, author) in blame.authors.iter().enumerate() {
        println!(
            "{}. {} {} line(s) ({:.1}%)",
            (i + 1).to_string().cyan(),
            author.name.bold(),
            author.line_count,
            author.line_count as f64 * 100.0 / total
        );
    }

    Ok(())
}
