//! Main entry point for the rgzip CLI application.
//!
//! Handles everything around the codec: choosing output names, replacing
//! the source file on success, removing partial output on failure, and the
//! exit status.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info, warn};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::UNIX_EPOCH;

use rgzip::{Cli, Destination, InputBuffer, compress, unzip};

/// Suffixes recognised when decompressing, besides `--suffix`.
const KNOWN_SUFFIXES: [&str; 5] = [".gz", ".z", "-gz", "-z", "_z"];
const TAR_SUFFIXES: [&str; 2] = [".tgz", ".taz"];

/// Result of one file that did not fail.
enum Outcome {
    Done,
    Warning,
}

fn main() -> ExitCode {
    // Status 2 means "warnings" here, so usage errors exit with 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .verbosity(cli.log_verbosity())
        .init()
    {
        eprintln!("rgzip: cannot set up logging: {e}");
    }

    let files = if cli.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.files.clone()
    };

    let mut failed = false;
    let mut warned = false;
    for file in &files {
        match process(&cli, file) {
            Ok(Outcome::Done) => {}
            Ok(Outcome::Warning) => warned = true,
            Err(e) => {
                error!("{}: {:#}", display_name(file), e);
                if let Some(err) = e.downcast_ref::<rgzip::Error>() {
                    if err.is_fatal() {
                        return ExitCode::FAILURE;
                    }
                }
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else if warned {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Process a single file, or standard input for "-".
fn process(cli: &Cli, path: &Path) -> Result<Outcome> {
    if path == Path::new("-") {
        return process_stdin(cli);
    }

    let metadata = fs::metadata(path).context("cannot open")?;
    if metadata.is_dir() {
        warn!("{}: is a directory -- ignored", path.display());
        return Ok(Outcome::Warning);
    }

    if cli.is_decoding() {
        decompress_file(cli, path)
    } else {
        compress_file(cli, path, &metadata)
    }
}

fn process_stdin(cli: &Cli) -> Result<Outcome> {
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    if cli.is_decoding() {
        let mut input = InputBuffer::new(stdin);
        let report = if cli.test {
            unzip(&mut input, &mut io::sink(), Destination::PassThrough)?
        } else {
            unzip(&mut input, &mut stdout, Destination::PassThrough)?
        };
        return Ok(report_warnings("stdin", &report));
    }

    refuse_terminal(cli.force, stdout.is_terminal())?;
    compress(stdin, &mut stdout, &cli.compress_options())?;
    Ok(Outcome::Done)
}

fn refuse_terminal(force: bool, is_terminal: bool) -> Result<()> {
    if !force && is_terminal {
        bail!("compressed data not written to a terminal. Use -f to force compression.");
    }
    Ok(())
}

fn report_warnings(name: &str, report: &rgzip::Report) -> Outcome {
    if report.extra_entries_ignored {
        warn!("{}: has more than one entry--rest ignored", name);
    }
    if report.trailing_garbage {
        warn!("{}: decompression OK, trailing garbage ignored", name);
    }
    if report.has_warnings() {
        Outcome::Warning
    } else {
        Outcome::Done
    }
}

fn decompress_file(cli: &Cli, path: &Path) -> Result<Outcome> {
    let name = path.display().to_string();
    let mut input = InputBuffer::new(File::open(path).context("cannot open")?);

    if cli.test {
        let report = unzip(&mut input, &mut io::sink(), Destination::PassThrough)?;
        info!("{}:\t OK", name);
        return Ok(report_warnings(&name, &report));
    }
    if cli.stdout {
        let mut stdout = io::stdout().lock();
        let report = unzip(&mut input, &mut stdout, Destination::PassThrough)?;
        return Ok(report_warnings(&name, &report));
    }

    let Some(output_path) = decompressed_name(path, &cli.suffix) else {
        warn!("{}: unknown suffix -- ignored", name);
        return Ok(Outcome::Warning);
    };
    ensure_distinct(path, &output_path)?;
    let mut output = create_output(&output_path, cli.force)?;
    let report = match unzip(&mut input, &mut output, Destination::InPlace) {
        Ok(report) => report,
        Err(e) => {
            discard_output(output, &output_path);
            return Err(e.into());
        }
    };
    finish_output(output, &output_path)?;

    info!(
        "{}:\t{:5.1}% -- replaced with {}",
        name,
        ratio(report.bytes_in, report.bytes_out),
        output_path.display()
    );
    remove_source(cli, path)?;
    Ok(report_warnings(&name, &report))
}

fn compress_file(cli: &Cli, path: &Path, metadata: &fs::Metadata) -> Result<Outcome> {
    let name = path.display().to_string();
    if !cli.stdout && !cli.force && has_suffix(path, &cli.suffix) {
        warn!("{}: already has {} suffix -- unchanged", name, cli.suffix);
        return Ok(Outcome::Warning);
    }

    let mut options = cli.compress_options();
    if !cli.no_name {
        options.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned().into_bytes());
        options.modification_time = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .and_then(|d| u32::try_from(d.as_secs()).ok())
            .unwrap_or(0);
    }

    if cli.stdout {
        let mut stdout = io::stdout().lock();
        refuse_terminal(cli.force, stdout.is_terminal())?;
        let input = File::open(path).context("cannot open")?;
        compress(input, &mut stdout, &options)?;
        return Ok(Outcome::Done);
    }

    let output_path = compressed_name(path, &cli.suffix);
    ensure_distinct(path, &output_path)?;
    let input = File::open(path).context("cannot open")?;
    let mut output = create_output(&output_path, cli.force)?;
    let transfer = match compress(input, &mut output, &options) {
        Ok(transfer) => transfer,
        Err(e) => {
            discard_output(output, &output_path);
            return Err(e.into());
        }
    };
    finish_output(output, &output_path)?;

    info!(
        "{}:\t{:5.1}% -- replaced with {}",
        name,
        ratio(transfer.bytes_out, transfer.bytes_in),
        output_path.display()
    );
    remove_source(cli, path)?;
    Ok(Outcome::Done)
}

/// Space saved, as gzip reports it: compressed size relative to original.
fn ratio(compressed: u64, original: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        100.0 * (1.0 - compressed as f64 / original as f64)
    }
}

/// The output must never be the source, or the source is truncated.
fn ensure_distinct(source: &Path, output: &Path) -> Result<()> {
    let same = source == output
        || fs::canonicalize(output)
            .ok()
            .zip(fs::canonicalize(source).ok())
            .is_some_and(|(a, b)| a == b);
    if same {
        bail!("output would overwrite the input file -- unchanged");
    }
    Ok(())
}

fn create_output(path: &Path, force: bool) -> Result<BufWriter<File>> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options.open(path).with_context(|| {
        format!("cannot create {} (use -f to overwrite)", path.display())
    })?;
    Ok(BufWriter::new(file))
}

fn finish_output(mut output: BufWriter<File>, path: &Path) -> Result<()> {
    if let Err(e) = output.flush() {
        discard_output(output, path);
        return Err(e).with_context(|| format!("cannot write {}", path.display()));
    }
    Ok(())
}

/// Close and delete a partially written output file.
fn discard_output(output: BufWriter<File>, path: &Path) {
    drop(output.into_parts());
    if let Err(e) = fs::remove_file(path) {
        warn!("{}: cannot remove partial output: {}", path.display(), e);
    }
}

fn remove_source(cli: &Cli, path: &Path) -> Result<()> {
    if !cli.keep {
        fs::remove_file(path).with_context(|| format!("cannot remove {}", path.display()))?;
    }
    Ok(())
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > suffix.len() && n.ends_with(suffix))
}

fn compressed_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Output name for a compressed file, or `None` for an unknown suffix.
fn decompressed_name(path: &Path, suffix: &str) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;

    let stripped = std::iter::once(suffix)
        .chain(KNOWN_SUFFIXES)
        .filter(|s| !s.is_empty())
        .find_map(|s| file_name.strip_suffix(s).map(str::to_string))
        .or_else(|| {
            TAR_SUFFIXES
                .iter()
                .find_map(|s| file_name.strip_suffix(s).map(|stem| format!("{stem}.tar")))
        })?;

    if stripped.is_empty() || stripped == ".tar" {
        return None;
    }
    Some(path.with_file_name(stripped))
}
