//! Repairs UTF-8 text that was decoded as Windows-1252 somewhere upstream
//! (mojibake such as `â€™` for `'`) in JSON sample data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Corrupted sequences and their ASCII replacement, longest first so that the
/// bare `â€` prefix is only consumed after every longer form.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    // corrupted apostrophe pattern
    ("\u{e2}\u{20ac}\u{161}\u{c3}\u{201e}\u{c3}\u{b4}", "'"),
    // em-dash
    ("\u{e2}\u{20ac}\u{201d}", "-"),
    // en-dash
    ("\u{e2}\u{20ac}\u{201c}", "-"),
    // right single quote
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    // left single quote
    ("\u{e2}\u{20ac}\u{2dc}", "'"),
    // left double quote
    ("\u{e2}\u{20ac}\u{153}", "\""),
    // narrow no-break space
    ("\u{e2}\u{20ac}\u{af}", " "),
    // bullet
    ("\u{e2}\u{20ac}\u{a2}", "-"),
    // right double quote, whose last byte has no Windows-1252 glyph
    ("\u{e2}\u{20ac}", "\""),
];

/// Apply every replacement to `content`, returning the repaired text and the
/// number of substitutions made.
pub fn fix_text(content: &str) -> (String, usize) {
    let mut fixed = content.to_string();
    let mut total = 0;

    for (corrupted, replacement) in REPLACEMENTS {
        let count = fixed.matches(corrupted).count();
        if count > 0 {
            fixed = fixed.replace(corrupted, replacement);
            total += count;
            log::info!("  Replaced {}x {:?} -> {:?}", count, corrupted, replacement);
        }
    }

    (fixed, total)
}

/// Repair one file in place. The file is only rewritten when something changed.
pub fn fix_file(path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let (fixed, total) = fix_text(&content);
    if total > 0 {
        fs::write(path, fixed).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(total)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub files_fixed: usize,
    pub replacements: usize,
}

/// Repair every `*.json` file below `dir`.
pub fn fix_directory(dir: &Path) -> Result<CleanupSummary> {
    let mut files = Vec::new();
    collect_json_files(dir, &mut files)?;
    files.sort();

    let mut summary = CleanupSummary::default();
    for file in files {
        let fixes = fix_file(&file)?;
        if fixes > 0 {
            log::info!(
                "Fixed {} issues in {}",
                fixes,
                file.file_name().unwrap_or_default().to_string_lossy()
            );
            summary.files_fixed += 1;
            summary.replacements += fixes;
        }
    }

    Ok(summary)
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    Ok(())
}
