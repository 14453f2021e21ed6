//! CLI entry point for the `dfu-flash` binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use bootloader_core as _;
use dfu_flasher::{build_stream, encode_stream, replay, ReplayOptions, DEFAULT_CHUNK_LEN};
use thiserror as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: dfu-flash <command> [options]

Commands:
  pack <image> [-o <output>] [--chunk <bytes>]    Build a packet-stream container
  simulate <image> [--chunk <bytes>] [--verbose]  Replay the stream in-process

Options:
  -o, --output <file>  Output file path (default: input stem + .dfu)
  -c, --chunk <bytes>  DATA payload length per packet (default: 128)
  -v, --verbose        Print the core status report after simulation
  -h, --help           Show this help message

Examples:
  dfu-flash pack firmware.bin
  dfu-flash pack firmware.bin -o firmware.dfu --chunk 192
  dfu-flash simulate firmware.bin --verbose
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Pack(PackArgs),
    Simulate(SimulateArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct PackArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    chunk_len: usize,
}

#[derive(Debug, PartialEq, Eq)]
struct SimulateArgs {
    input: PathBuf,
    chunk_len: usize,
    verbose: bool,
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
        "pack" => parse_pack_args(args)
            .map(Command::Pack)
            .map(ParseResult::Command),
        "simulate" => parse_simulate_args(args)
            .map(Command::Simulate)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_chunk_value(value: &OsString) -> Result<usize, String> {
    value
        .to_string_lossy()
        .parse::<usize>()
        .map_err(|_| format!("invalid chunk length: {}", value.to_string_lossy()))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_pack_args(mut args: impl Iterator<Item = OsString>) -> Result<PackArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut chunk_len = DEFAULT_CHUNK_LEN;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg == "-c" || arg == "--chunk" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --chunk".to_string())?;
            chunk_len = parse_chunk_value(&value)?;
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
    Ok(PackArgs {
        input,
        output,
        chunk_len,
    })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_simulate_args(mut args: impl Iterator<Item = OsString>) -> Result<SimulateArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut chunk_len = DEFAULT_CHUNK_LEN;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "-c" || arg == "--chunk" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --chunk".to_string())?;
            chunk_len = parse_chunk_value(&value)?;
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
    Ok(SimulateArgs {
        input,
        chunk_len,
        verbose,
    })
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    parent.join(format!("{stem}.dfu"))
}

fn read_image(path: &Path) -> Result<Vec<u8>, i32> {
    fs::read(path).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        1
    })
}

fn run_pack(args: PackArgs) -> Result<(), i32> {
    let image = read_image(&args.input)?;

    let frames = match build_stream(&image, args.chunk_len) {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(1);
        }
    };

    let container = encode_stream(&frames);
    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    if let Err(e) = fs::write(&output_path, &container) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    println!(
        "Packed {} ({} bytes, {} packets) -> {}",
        args.input.display(),
        image.len(),
        frames.len(),
        output_path.display()
    );

    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<(), i32> {
    let image = read_image(&args.input)?;

    let frames = match build_stream(&image, args.chunk_len) {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(1);
        }
    };

    let report = replay(&frames, &ReplayOptions::default());

    println!(
        "Replayed {} packets: {} ACK, {} NACK, {} retransmitted",
        frames.len(),
        report.acks,
        report.nacks.len(),
        report.retransmissions
    );
    #[allow(clippy::cast_precision_loss)]
    let elapsed_ms = report.elapsed_us as f64 / 1_000.0;
    println!(
        "Final state {:?} after {elapsed_ms:.1} ms simulated",
        report.final_state
    );
    if let Some(record) = report.validation {
        println!(
            "Verification: {} ({} bytes, calculated {:#06x}, expected {:#06x})",
            if record.valid { "passed" } else { "FAILED" },
            record.size,
            record.calculated_crc,
            record.expected_crc
        );
    }

    if args.verbose {
        println!();
        println!("{}", make_status_summary(&report));
    }

    if report.succeeded() {
        Ok(())
    } else {
        Err(1)
    }
}

fn make_status_summary(report: &dfu_flasher::ReplayReport) -> String {
    format!(
        "packets: processed={} dropped={}\ncounters: errors={} recoveries={} launches={}",
        report.stats.packets_processed,
        report.stats.packets_dropped,
        report.stats.error_count,
        report.stats.recovery_attempts,
        report.stats.app_launch_attempts
    )
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Pack(args))) => match run_pack(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Simulate(args))) => match run_simulate(&args) {
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
