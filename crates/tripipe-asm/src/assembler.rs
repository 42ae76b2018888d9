//! Top-level assembler pipeline and program loader.
//!
//! Assembly is a single pass: every source line is parsed, all parse errors
//! are collected, and instructions are packed into words in program order.
//! [`load_program`] picks between a binary image and assembly source by file
//! extension and yields a ready-to-run [`CoreState`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use tripipe_core::{encode_image, CoreState, INSTRUCTION_STORE_WORDS};

use crate::encoder::encode_line;
use crate::errors::{AssemblerError, AssemblerErrorKind, ErrorCollection, SourceLoc};
use crate::parser::parse_line;
use crate::source::{read_source, SourceContent};

/// File extension that selects binary image loading.
pub const IMAGE_EXTENSION: &str = "bin";

/// A warning generated during assembly (non-fatal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleWarning {
    /// Kind of warning.
    pub kind: AssembleWarningKind,
    /// Source location of the offending line.
    pub location: SourceLoc,
}

/// Classification of assembly warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleWarningKind {
    /// Instruction encodes as `0x0000`, which fetch treats as end of program.
    SentinelWord {
        /// Instruction-store address of the word.
        address: u16,
    },
}

impl std::fmt::Display for AssembleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            AssembleWarningKind::SentinelWord { address } => write!(
                f,
                "{}: instruction at 0x{address:04X} encodes as 0x0000 and ends the program when fetched",
                self.location
            ),
        }
    }
}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Instruction-store address.
    pub address: u16,
    /// Encoded instruction word.
    pub word: u16,
    /// Source line text.
    pub source: String,
    /// 1-indexed source line number.
    pub line: usize,
}

/// Result of assembly: the program words plus metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleResult {
    /// Instruction words in program order.
    pub program: Vec<u16>,
    /// One listing entry per instruction.
    pub listing: Vec<ListingEntry>,
    /// Warnings generated during assembly.
    pub warnings: Vec<AssembleWarning>,
}

impl AssembleResult {
    /// Big-endian binary image of the program.
    #[must_use]
    pub fn image(&self) -> Vec<u8> {
        encode_image(&self.program)
    }
}

/// Assembles already-loaded source.
///
/// # Errors
///
/// Returns every parse error in the source, plus a
/// [`AssemblerErrorKind::TooManyInstructions`] error located at the first
/// instruction that does not fit the instruction store.
#[allow(clippy::cast_possible_truncation)]
pub fn assemble_source(source: &SourceContent) -> Result<AssembleResult, ErrorCollection> {
    let file = PathBuf::from(&source.file_path);
    let mut errors = ErrorCollection::new();
    let mut result = AssembleResult::default();
    let mut instruction_count = 0usize;
    let mut overflow_line = None;

    for line in &source.lines {
        let parsed = match parse_line(&line.text, line.original_line) {
            Ok(parsed) => parsed,
            Err(error) => {
                errors.push(AssemblerError::from_parse(file.clone(), error));
                continue;
            }
        };
        let Some(word) = encode_line(&parsed) else {
            continue;
        };

        instruction_count += 1;
        if result.program.len() >= INSTRUCTION_STORE_WORDS {
            if overflow_line.is_none() {
                overflow_line = Some(line.original_line);
            }
            continue;
        }

        let address = result.program.len() as u16;
        debug!(line = line.original_line, address, word, "encoded instruction");

        if word == 0 {
            result.warnings.push(AssembleWarning {
                kind: AssembleWarningKind::SentinelWord { address },
                location: SourceLoc::new(file.clone(), line.original_line),
            });
        }
        result.program.push(word);
        result.listing.push(ListingEntry {
            address,
            word,
            source: line.text.trim().to_string(),
            line: line.original_line,
        });
    }

    if let Some(line) = overflow_line {
        errors.push(
            AssemblerError::new(AssemblerErrorKind::TooManyInstructions {
                count: instruction_count,
                capacity: INSTRUCTION_STORE_WORDS,
            })
            .with_location(SourceLoc::new(file.clone(), line)),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    info!(
        file = %file.display(),
        instructions = result.program.len(),
        "assembled program"
    );
    Ok(result)
}

/// Reads and assembles a source file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, otherwise everything
/// [`assemble_source`] reports.
pub fn assemble_file(path: &Path) -> Result<AssembleResult, ErrorCollection> {
    let source = read_source(path).map_err(|e| {
        AssemblerError::new(AssemblerErrorKind::Io(format!("{}: {e}", path.display())))
    })?;
    assemble_source(&source)
}

/// Returns true when `path` names a binary image rather than source.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
}

/// Loads a program into a fresh [`CoreState`].
///
/// `.bin` files are read as big-endian binary images; anything else is
/// assembled from text.
///
/// # Errors
///
/// Returns I/O, image-format, or assembly errors.
pub fn load_program(path: &Path) -> Result<CoreState, ErrorCollection> {
    if is_image_path(path) {
        let bytes = fs::read(path).map_err(|e| {
            AssemblerError::new(AssemblerErrorKind::Io(format!("{}: {e}", path.display())))
        })?;
        return CoreState::from_image(&bytes).map_err(|e| AssemblerError::from(e).into());
    }

    let assembled = assemble_file(path)?;
    CoreState::with_program(&assembled.program).map_err(|e| AssemblerError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;
    use crate::source::extract_source;
    use std::fmt::Write as _;
    use tripipe_core::GeneralRegister;

    fn create_temp_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn assemble_text(text: &str) -> Result<AssembleResult, ErrorCollection> {
        assemble_source(&extract_source(Path::new("prog.asm"), text))
    }

    #[test]
    fn assemble_empty_source() {
        let result = assemble_text("").unwrap();
        assert!(result.program.is_empty());
        assert!(result.listing.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn assemble_skips_blanks_and_comments() {
        let text = "; counter setup\n\nMOVI R1 5 ; five\n# accumulate\nADD R2 R1\n";
        let result = assemble_text(text).unwrap();

        assert_eq!(result.program, vec![0x3045, 0x0081]);
        assert_eq!(result.listing.len(), 2);
        assert_eq!(result.listing[0].address, 0);
        assert_eq!(result.listing[0].line, 3);
        assert_eq!(result.listing[0].source, "MOVI R1 5 ; five");
        assert_eq!(result.listing[1].address, 1);
        assert_eq!(result.listing[1].line, 5);
    }

    #[test]
    fn image_is_big_endian() {
        let result = assemble_text("MOVI R3 5\nADD R1 R2\n").unwrap();
        assert_eq!(result.image(), vec![0x30, 0xC5, 0x00, 0x42]);
    }

    #[test]
    fn all_parse_errors_are_collected_with_lines() {
        let text = "MOVI R1 5\nNOP R1 R1\nADD R1\nMOVI R1 99\n";
        let errors = assemble_text(text).unwrap_err();

        let found: Vec<_> = errors
            .iter()
            .map(|e| (e.location.as_ref().map(|loc| loc.line), e.kind.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                (
                    Some(2),
                    AssemblerErrorKind::Parse(ParseErrorKind::UnknownMnemonic("NOP".into()))
                ),
                (
                    Some(3),
                    AssemblerErrorKind::Parse(ParseErrorKind::OperandCount {
                        mnemonic: "ADD".into(),
                        found: 1
                    })
                ),
                (
                    Some(4),
                    AssemblerErrorKind::Parse(ParseErrorKind::ImmediateOutOfRange(99))
                ),
            ]
        );
        assert!(errors
            .format_for_stderr()
            .starts_with("prog.asm:2: error: unknown mnemonic: NOP"));
    }

    #[test]
    fn program_larger_than_instruction_store_is_rejected() {
        let mut text = String::new();
        for _ in 0..=INSTRUCTION_STORE_WORDS {
            writeln!(text, "MOVI R1 1").unwrap();
        }

        let errors = assemble_text(&text).unwrap_err();
        let error = errors.first().unwrap();
        assert_eq!(
            error.kind,
            AssemblerErrorKind::TooManyInstructions {
                count: INSTRUCTION_STORE_WORDS + 1,
                capacity: INSTRUCTION_STORE_WORDS
            }
        );
        assert_eq!(
            error.location.as_ref().map(|loc| loc.line),
            Some(INSTRUCTION_STORE_WORDS + 1)
        );
    }

    #[test]
    fn full_instruction_store_is_accepted() {
        let text = "MOVI R1 1\n".repeat(INSTRUCTION_STORE_WORDS);
        let result = assemble_text(&text).unwrap();
        assert_eq!(result.program.len(), INSTRUCTION_STORE_WORDS);
    }

    #[test]
    fn sentinel_encoding_is_warned() {
        let result = assemble_text("MOVI R1 1\nADD R0 R0\n").unwrap();

        assert_eq!(result.program, vec![0x3041, 0x0000]);
        assert_eq!(
            result.warnings,
            vec![AssembleWarning {
                kind: AssembleWarningKind::SentinelWord { address: 1 },
                location: SourceLoc::new(PathBuf::from("prog.asm"), 2),
            }]
        );
        assert!(result.warnings[0].to_string().starts_with("prog.asm:2: "));
    }

    #[test]
    fn assemble_file_reports_missing_input() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.asm");

        let errors = assemble_file(&missing).unwrap_err();
        assert!(matches!(
            errors.first().map(|e| &e.kind),
            Some(AssemblerErrorKind::Io(_))
        ));
    }

    #[test]
    fn load_program_assembles_text() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = create_temp_file(temp_dir.path(), "prog.asm", b"MOVI R2 7\n");

        let state = load_program(&path).unwrap();
        assert_eq!(state.instructions.word(0), 0x3087);
        assert_eq!(state.instructions.word(1), 0);
        assert_eq!(state.arch.gpr(GeneralRegister::from_u6(2)), 0);
    }

    #[test]
    fn load_program_reads_binary_images() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = create_temp_file(temp_dir.path(), "prog.BIN", &[0x30, 0xC5, 0x00, 0x42]);

        let state = load_program(&path).unwrap();
        assert_eq!(state.instructions.word(0), 0x30C5);
        assert_eq!(state.instructions.word(1), 0x0042);
    }

    #[test]
    fn load_program_rejects_odd_images() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = create_temp_file(temp_dir.path(), "odd.bin", &[0x30, 0xC5, 0x00]);

        let errors = load_program(&path).unwrap_err();
        assert_eq!(
            errors.first().map(|e| e.kind.clone()),
            Some(AssemblerErrorKind::Image(
                tripipe_core::ImageError::OddLength { len: 3 }
            ))
        );
    }

    #[test]
    fn image_extension_detection() {
        assert!(is_image_path(Path::new("a.bin")));
        assert!(is_image_path(Path::new("dir/a.Bin")));
        assert!(!is_image_path(Path::new("a.asm")));
        assert!(!is_image_path(Path::new("bin")));
    }
}
