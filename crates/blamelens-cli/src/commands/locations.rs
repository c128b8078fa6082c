//! Locations command implementation.

use super::{print_json, Context};
use anyhow::Result;
use blamelens_core::LineRange;
use colored::Colorize;
use std::path::Path;

/// Run the locations command.
pub async fn run(ctx: &Context, file: &Path, lines: LineRange) -> Result<()> {
    let Some(file_name) = ctx.tracked_file(file)? else {
        return Ok(());
    };

    let locations = ctx.service.get_blame_locations(&file_name, lines).await?;

    if ctx.json {
        return print_json(&locations);
    }

    for location in &locations {
        println!(
            "{}/{} {} {}:{}",
            location.index.to_string().cyan(),
            location.commit_count,
            location.sha.yellow(),
            location.file_name,
            location.line.original_line + 1
        );
    }

    Ok(())
}
