//! CLI entry point for the tripipe assembler and simulator.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror as _;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tripipe_asm::{assemble_file, load_program, AssembleResult, ErrorCollection};
use tripipe_core::{
    disassemble, disassemble_program, disassemble_window, format_instruction_memory,
    format_pipeline_row, run_until_drained, CoreConfig, FinalReport, RunStop, DEFAULT_MAX_CYCLES,
};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: tripipe <command> [options]

Commands:
  build <input> [-o <output>] [--verbose]       Assemble source to a binary image
  run   <input> [--max-cycles <n>] [--quiet]    Load a program and simulate it
  disasm <input>                                Print the loaded program up to its sentinel

Options:
  -o, --output <file>   Output file path (default: input stem + .bin)
  -v, --verbose         Print listing to stderr (build only)
  --max-cycles <n>      Cycle budget before giving up (default: 1000000)
  -q, --quiet           Skip per-cycle pipeline rows (run only)
  -h, --help            Show this help message

Inputs ending in .bin are loaded as big-endian images; anything else is
assembled from text.

Examples:
  tripipe build program.asm
  tripipe build program.asm -o program.bin
  tripipe run program.asm
  tripipe run program.bin --quiet
  tripipe disasm program.bin
";

/// Instructions shown on either side of `PC` when a run is cut short.
const STALL_WINDOW: u16 = 3;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build(BuildArgs),
    Run(RunArgs),
    Disasm(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    max_cycles: u64,
    quiet: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "build" => parse_build_args(args)
            .map(Command::Build)
            .map(ParseResult::Command),
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "disasm" => parse_disasm_args(args)
            .map(Command::Disasm)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_build_args(mut args: impl Iterator<Item = OsString>) -> Result<BuildArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(BuildArgs {
        input,
        output,
        verbose,
    })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut max_cycles = DEFAULT_MAX_CYCLES;
    let mut quiet = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--quiet" || arg == "-q" {
            quiet = true;
            continue;
        }

        if arg == "--max-cycles" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-cycles".to_string())?;
            let text = value.to_string_lossy();
            max_cycles = text
                .parse::<u64>()
                .map_err(|_| format!("invalid cycle budget: {text}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(RunArgs {
        input,
        max_cycles,
        quiet,
    })
}

fn parse_disasm_args(args: impl Iterator<Item = OsString>) -> Result<PathBuf, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    input.ok_or_else(|| "missing input path".to_string())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    parent.join(format!("{stem}.bin"))
}

fn report_errors(errors: &ErrorCollection) {
    eprintln!("{}", errors.format_for_stderr());
}

fn run_build(args: BuildArgs) -> Result<(), i32> {
    let result = assemble_file(&args.input).map_err(|errors| {
        report_errors(&errors);
        1
    })?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let image = result.image();

    if let Err(e) = fs::write(&output_path, &image) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    if args.verbose {
        print_listing(&result);
    }

    println!(
        "Assembled {} ({} instructions, {} bytes) -> {}",
        args.input.display(),
        result.program.len(),
        image.len(),
        output_path.display()
    );

    Ok(())
}

fn print_listing(result: &AssembleResult) {
    for entry in &result.listing {
        eprintln!(
            "{:04X}: {:04X}  {:<16} ; {}: {}",
            entry.address,
            entry.word,
            disassemble(entry.word),
            entry.line,
            entry.source
        );
    }
}

fn run_simulation(args: &RunArgs) -> Result<(), i32> {
    let mut state = load_program(&args.input).map_err(|errors| {
        report_errors(&errors);
        1
    })?;

    println!("Instruction memory loaded.");
    print!("{}", format_instruction_memory(&state.instructions));
    println!();
    println!("===== Simulation Start =====");

    let config = CoreConfig {
        max_cycles: args.max_cycles,
        ..CoreConfig::default()
    };
    let quiet = args.quiet;
    let outcome = run_until_drained(&mut state, &config, |cycle, state| {
        if !quiet {
            print!("{}", format_pipeline_row(cycle, state));
        }
    });

    println!(
        "===== Simulation End ({} cycles, {} retired, {} flushes) =====",
        outcome.cycles, state.stats.retired, state.stats.flushes
    );
    println!();

    if outcome.stop == RunStop::BudgetExhausted {
        warn!(cycles = outcome.cycles, "cycle budget exhausted");
        eprintln!(
            "warning: program did not finish within {} cycles (PC=0x{:04X})",
            args.max_cycles,
            state.arch.pc()
        );
        for row in disassemble_window(
            state.arch.pc(),
            STALL_WINDOW,
            STALL_WINDOW,
            state.instructions.words(),
        ) {
            eprintln!("  {:04X}: {:04X}  {}", row.addr, row.raw_word, row.text());
        }
    }

    print!("{}", FinalReport(&state));
    Ok(())
}

fn run_disasm(input: &Path) -> Result<(), i32> {
    let state = load_program(input).map_err(|errors| {
        report_errors(&errors);
        1
    })?;

    for row in disassemble_program(state.instructions.words()) {
        println!("{:04X}: {:04X}  {}", row.addr, row.raw_word, row.text());
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Build(args))) => match run_build(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Run(args))) => match run_simulation(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Disasm(input))) => match run_disasm(&input) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os_args(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_build_command() {
        let result = parse_build_args(os_args(&["program.asm", "-o", "out.bin", "--verbose"]))
            .expect("valid build args should parse");

        assert_eq!(
            result,
            BuildArgs {
                input: PathBuf::from("program.asm"),
                output: Some(PathBuf::from("out.bin")),
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_run_command() {
        let result = parse_run_args(os_args(&["program.bin", "--max-cycles", "500", "-q"]))
            .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                input: PathBuf::from("program.bin"),
                max_cycles: 500,
                quiet: true,
            }
        );
    }

    #[test]
    fn run_defaults_to_full_budget() {
        let result = parse_run_args(os_args(&["program.asm"])).expect("input only");
        assert_eq!(result.max_cycles, DEFAULT_MAX_CYCLES);
        assert!(!result.quiet);
    }

    #[test]
    fn run_rejects_bad_budget() {
        let error = parse_run_args(os_args(&["p.asm", "--max-cycles", "lots"]))
            .expect_err("non-numeric budget should fail");
        assert!(error.contains("invalid cycle budget"));

        let error = parse_run_args(os_args(&["p.asm", "--max-cycles"]))
            .expect_err("missing budget should fail");
        assert!(error.contains("missing value"));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os_args(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn parses_run_via_dispatch() {
        let result = parse_args(os_args(&["run", "p.asm"])).expect("run should parse");
        assert!(matches!(result, ParseResult::Command(Command::Run(_))));
    }

    #[test]
    fn parses_disasm_via_dispatch() {
        let result = parse_args(os_args(&["disasm", "p.bin"])).expect("disasm should parse");
        assert!(matches!(
            result,
            ParseResult::Command(Command::Disasm(path)) if path == PathBuf::from("p.bin")
        ));

        let error = parse_disasm_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));
    }

    #[test]
    fn rejects_unknown_command() {
        let error =
            parse_args(os_args(&["unknown"])).expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn default_output_path_simple() {
        let output = default_output_path(&PathBuf::from("program.asm"));
        assert_eq!(output, PathBuf::from("program.bin"));
    }

    #[test]
    fn default_output_path_with_dir() {
        let output = default_output_path(&PathBuf::from("src/program.asm"));
        assert_eq!(output, PathBuf::from("src/program.bin"));
    }

    #[test]
    fn default_output_path_no_extension() {
        let output = default_output_path(&PathBuf::from("program"));
        assert_eq!(output, PathBuf::from("program.bin"));
    }

    #[test]
    fn parse_build_missing_input() {
        let error = parse_build_args(std::iter::empty()).expect_err("missing input should fail");
        assert!(error.contains("missing input"));
    }

    #[test]
    fn parse_run_rejects_unknown_options() {
        let error =
            parse_run_args(os_args(&["--verbose"])).expect_err("run should reject --verbose");
        assert!(error.contains("unknown option"));
    }
}
