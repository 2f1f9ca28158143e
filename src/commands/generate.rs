//! Generate static files and maintain the metadata index

use anyhow::Result;

use crate::content::ConsistencyReport;
use crate::Site;

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    let report = site.generate()?;
    println!(
        "Generated {} posts on {} index pages into {:?}",
        report.posts, report.pages, site.output_dir
    );
    for path in &report.pruned {
        println!("  removed stale {:?}", path);
    }
    Ok(())
}

/// Rebuild the metadata index from post files
pub fn reindex(site: &Site) -> Result<()> {
    let index = site.store().rebuild_index()?;
    println!("Indexed {} posts", index.len());
    Ok(())
}

/// Report disagreements between the index and the post files.
/// Returns the report so the caller can choose the exit status.
pub fn verify(site: &Site) -> Result<ConsistencyReport> {
    let report = site.store().verify()?;

    if report.is_consistent() {
        println!("Index and post files agree");
        return Ok(report);
    }

    for slug in &report.missing_files {
        println!("  indexed but no file: {}", slug);
    }
    for slug in &report.unindexed_files {
        println!("  file but not indexed: {}", slug);
    }
    for slug in &report.mismatched {
        println!("  index entry differs from file: {}", slug);
    }
    for (slug, reason) in &report.unreadable {
        println!("  unreadable: {} ({})", slug, reason);
    }
    println!("Run `quire reindex` to rebuild the index from post files");
    Ok(report)
}
