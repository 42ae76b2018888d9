//! Source ingestion for assembly files.
//!
//! Lines keep their 1-indexed position in the original file so parse
//! errors can point back at it.

use std::fs;
use std::io;
use std::path::Path;

/// A line of source with its original location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The source text (without trailing newline).
    pub text: String,
    /// 1-indexed line number in the original file.
    pub original_line: usize,
}

/// Source content of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    /// All source lines in file order.
    pub lines: Vec<SourceLine>,
    /// The file path (for error reporting).
    pub file_path: String,
}

/// Splits `content` into numbered source lines.
#[must_use]
pub fn extract_source(file_path: &Path, content: &str) -> SourceContent {
    let lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| SourceLine {
            text: line.to_string(),
            original_line: idx + 1,
        })
        .collect();

    SourceContent {
        lines,
        file_path: file_path.to_string_lossy().to_string(),
    }
}

/// Reads and splits a source file.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be read as UTF-8.
pub fn read_source(path: &Path) -> io::Result<SourceContent> {
    let content = fs::read_to_string(path)?;
    Ok(extract_source(path, &content))
}
