//! Line command implementation.

use super::{commit_label, print_json, Context};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Run the line command. `line` is 0-indexed.
pub async fn run(ctx: &Context, file: &Path, line: usize) -> Result<()> {
    let Some(file_name) = ctx.tracked_file(file)? else {
        return Ok(());
    };

    let Some(blame) = ctx.service.get_blame_for_line(&file_name, line).await? else {
        eprintln!("{} {} has no line {}", "✗".red(), file_name, line + 1);
        return Ok(());
    };

    if ctx.json {
        return print_json(&blame);
    }

    let commit = &blame.commit;
    println!("{}", commit_label(commit));
    println!("   {}", commit.message);
    println!(
        "   Line {} (line {} in {})",
        blame.line.line + 1,
        blame.line.original_line + 1,
        commit.display_file_name()
    );
    println!("   {} line(s) from this commit", blame.author.line_count);
    if let (Some(sha), Some(previous)) = (&commit.previous_sha, &commit.previous_file_name) {
        println!("   Previous: {} {}", sha.magenta(), previous);
    }

    Ok(())
}
