//! Blame command implementation.

use super::{commit_label, print_json, Context};
use anyhow::Result;
use blamelens_core::LineRange;
use colored::Colorize;
use std::path::Path;

/// Run the blame command.
pub async fn run(ctx: &Context, file: &Path, lines: Option<LineRange>) -> Result<()> {
    let Some(file_name) = ctx.tracked_file(file)? else {
        return Ok(());
    };

    let blame = match lines {
        Some(range) => ctx.service.get_blame_for_range(&file_name, range).await?,
        None => ctx.service.get_blame_for_file(&file_name).await?.for_file(),
    };

    if ctx.json {
        return print_json(&blame);
    }

    if blame.lines.is_empty() {
        println!("{} No blame for: {}", "⚠".yellow(), file_name);
        return Ok(());
    }

    for line in &blame.lines {
        let label = match blame.commit(&line.sha) {
            Some(commit) => commit_label(commit),
            None => line.sha.yellow().to_string(),
        };
        println!("{:>5} {}", (line.line + 1).to_string().dimmed(), label);
    }

    println!();
    println!(
        "{} {} line(s), {} commit(s), {} author(s)",
        "✓".green(),
        blame.lines.len(),
        blame.commits.len(),
        blame.authors.len()
    );

    Ok(())
}
