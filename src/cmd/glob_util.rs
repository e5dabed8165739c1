//! Expansion of positional input arguments into dump paths.
//!
//! Each argument is either a literal path or a glob pattern such as
//! `dumps/*.sql.gz`. Arguments keep their command-line order; files matched
//! by one pattern are sorted.

use ahash::AHashSet;
use std::path::{Path, PathBuf};

/// Check if a path string contains glob pattern characters.
pub fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

/// Expand one literal path or glob pattern.
pub fn expand_file_pattern(pattern: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern_str = pattern.to_string_lossy();

    if !is_glob_pattern(&pattern_str) {
        if !pattern.exists() {
            anyhow::bail!("file does not exist: {}", pattern.display());
        }
        return Ok(vec![pattern.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in glob::glob(&pattern_str)
        .map_err(|e| anyhow::anyhow!("invalid glob pattern '{}': {}", pattern_str, e))?
    {
        let path = entry.map_err(|e| {
            anyhow::anyhow!("error reading path for pattern '{}': {}", pattern_str, e)
        })?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        anyhow::bail!("no files match pattern: {}", pattern_str);
    }

    files.sort();
    Ok(files)
}

/// Expand every argument, dropping files already listed by an earlier one.
pub fn expand_inputs(patterns: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = AHashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        for file in expand_file_pattern(pattern)? {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    Ok(files)
}
