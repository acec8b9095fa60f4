//! Loading and saving path files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use garden_defence_geometry::PathGeometry;

/// Lane used when no path file is given: a serpentine across the field.
const BUILTIN_PATH: &str = "6\n0 100\n500 100\n500 300\n100 300\n100 500\n600 500\n";

/// Parses the built-in lane.
pub(crate) fn builtin() -> Result<PathGeometry> {
    BUILTIN_PATH.parse().context("built-in path is malformed")
}

/// Reads a path file.
pub(crate) fn load(file: &Path) -> Result<PathGeometry> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read path file {}", file.display()))?;
    text.parse()
        .with_context(|| format!("failed to parse path file {}", file.display()))
}

/// Writes `path` in the same format [`load`] reads.
pub(crate) fn save(path: &PathGeometry, file: &Path) -> Result<()> {
    fs::write(file, path.to_string())
        .with_context(|| format!("failed to write path file {}", file.display()))
}
