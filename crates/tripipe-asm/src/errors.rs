//! Structured error reporting for the assembler and program loader.
//!
//! All errors format to stderr in the standard style:
//! ```text
//! prog.asm:10: error: unknown mnemonic: NOP
//! ```
//!
//! Errors without a source line (I/O, image loading) omit the location.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tripipe_core::ImageError;

use crate::parser::{ParseError, ParseErrorKind};

/// A source location for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    /// File path.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: usize,
}

impl SourceLoc {
    /// Creates a new source location.
    #[must_use]
    pub const fn new(file: PathBuf, line: usize) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// An assembler or loader error with optional source context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerError {
    /// The kind of error.
    pub kind: AssemblerErrorKind,
    /// Source location if available.
    pub location: Option<SourceLoc>,
}

impl AssemblerError {
    /// Creates a new assembler error.
    #[must_use]
    pub const fn new(kind: AssemblerErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Wraps a parse error raised while reading `file`.
    #[must_use]
    pub fn from_parse(file: PathBuf, error: ParseError) -> Self {
        Self::new(AssemblerErrorKind::Parse(error.kind))
            .with_location(SourceLoc::new(file, error.line))
    }

    /// Adds a source location to the error.
    #[must_use]
    pub fn with_location(mut self, loc: SourceLoc) -> Self {
        self.location = Some(loc);
        self
    }

    /// Formats the error for stderr output.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.location.as_ref().map_or_else(
            || format!("error: {}", self.kind),
            |loc| format!("{loc}: error: {}", self.kind),
        )
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for AssemblerError {}

impl From<ImageError> for AssemblerError {
    fn from(e: ImageError) -> Self {
        Self::new(AssemblerErrorKind::Image(e))
    }
}

/// Classification of assembler errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerErrorKind {
    /// Source line failed to parse.
    #[error("{0}")]
    Parse(ParseErrorKind),
    /// Program does not fit the instruction store.
    #[error("program has {count} instructions but the instruction store holds {capacity}")]
    TooManyInstructions {
        /// Number of instructions in the source.
        count: usize,
        /// Instruction-store capacity in words.
        capacity: usize,
    },
    /// Binary image rejected by the core loader.
    #[error("invalid image: {0}")]
    Image(ImageError),
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(String),
}

/// A collection of multiple errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollection {
    errors: Vec<AssemblerError>,
}

impl ErrorCollection {
    /// Creates an empty error collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the collection.
    pub fn push(&mut self, error: AssemblerError) {
        self.errors.push(error);
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &AssemblerError> {
        self.errors.iter()
    }

    /// Formats all errors for stderr output, one per line.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.errors
            .iter()
            .map(AssemblerError::format_for_stderr)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the first error, if any.
    #[must_use]
    pub fn first(&self) -> Option<&AssemblerError> {
        self.errors.first()
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorCollection {}

impl From<AssemblerError> for ErrorCollection {
    fn from(error: AssemblerError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<AssemblerError> for ErrorCollection {
    fn from_iter<T: IntoIterator<Item = AssemblerError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}
