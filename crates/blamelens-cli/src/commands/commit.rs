//! Commit command implementation.

use super::{commit_label, print_json, Context};
use anyhow::Result;
use blamelens_core::LineRange;
use colored::Colorize;
use std::path::Path;

/// Run the commit command.
pub async fn run(ctx: &Context, file: &Path, sha: &str, lines: Option<LineRange>) -> Result<()> {
    let Some(file_name) = ctx.tracked_file(file)? else {
        return Ok(());
    };

    let range = lines.unwrap_or(LineRange::new(0, usize::MAX));
    let Some(result) = ctx
        .service
        .get_blame_for_sha_range(&file_name, sha, range)
        .await?
    else {
        eprintln!("{} Commit {} does not touch {}", "✗".red(), sha, file_name);
        return Ok(());
    };

    if ctx.json {
        return print_json(&result);
    }

    println!("{}", commit_label(&result.commit));
    println!("   {}", result.commit.message);
    println!();
    for line in &result.lines {
        println!(
            "{:>5} (was {})",
            (line.line + 1).to_string().green(),
            line.original_line + 1
        );
    }
    println!();
    println!("{} {} line(s)", "✓".green(), result.author.line_count);

    Ok(())
}
