use std::path::PathBuf;

use anyhow::{bail, Result};
use env_logger::Builder;
use lif_mdr::cleanup;
use log::LevelFilter;

const DEFAULT_SAMPLE_DATA_DIR: &str = "projects/mongodb/sample_data";

fn main() -> Result<()> {
    Builder::new().filter_level(LevelFilter::Info).init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DATA_DIR));

    if !dir.is_dir() {
        bail!("Sample data directory {} does not exist", dir.display());
    }

    println!("Fixing Unicode issues in JSON files under {}...", dir.display());
    let summary = cleanup::fix_directory(&dir)?;
    println!(
        "Fixed {} replacements across {} files",
        summary.replacements, summary.files_fixed
    );

    Ok(())
}
