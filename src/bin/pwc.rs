use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use log::debug;

use pwc::common::io::{FileData, open_noatime, read_stdin};
use pwc::common::io_error_msg;
use pwc::wc::{self, CountMode, CountOptions, FinalCount, WcError};

#[derive(Parser)]
#[command(
    name = "pwc",
    version,
    about = "Print newline, word, and byte counts for each FILE, counting large files in parallel"
)]
struct Cli {
    /// Print the byte counts
    #[arg(short = 'c', long = "bytes")]
    bytes: bool,

    /// Print the character counts (decodes UTF-8; malformed sequences count as one character)
    #[arg(short = 'm', long = "chars")]
    chars: bool,

    /// Print the newline counts
    #[arg(short = 'l', long = "lines")]
    lines: bool,

    /// Print the word counts
    #[arg(short = 'w', long = "words")]
    words: bool,

    /// Number of chunks to count concurrently (default: number of CPUs)
    #[arg(short = 'j', long = "parallel", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    parallel: Option<u16>,

    /// Inputs smaller than this many bytes are counted as a single chunk
    #[arg(long = "chunk-threshold", value_name = "BYTES", hide = true)]
    chunk_threshold: Option<u64>,

    /// Log planning details to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Files to process (reads stdin if none given)
    files: Vec<String>,
}

/// Which fields to display.
struct ShowFlags {
    lines: bool,
    words: bool,
    chars: bool,
    bytes: bool,
}

impl ShowFlags {
    fn columns(&self) -> usize {
        self.lines as usize + self.words as usize + self.chars as usize + self.bytes as usize
    }
}

/// Try to mmap stdin if it's a regular file (e.g., shell redirect `< file`).
/// Returns None if stdin is a pipe/terminal.
#[cfg(unix)]
fn try_mmap_stdin() -> Option<memmap2::Mmap> {
    use std::os::unix::io::{AsRawFd, FromRawFd};
    let stdin = io::stdin();
    let fd = stdin.as_raw_fd();

    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut stat) } != 0 {
        return None;
    }
    if (stat.st_mode & libc::S_IFMT) != libc::S_IFREG || stat.st_size <= 0 {
        return None;
    }

    let file = unsafe { std::fs::File::from_raw_fd(fd) };
    let mmap = unsafe { memmap2::MmapOptions::new().map(&file) }.ok();
    std::mem::forget(file); // Don't close stdin
    mmap
}

#[cfg(not(unix))]
fn try_mmap_stdin() -> Option<memmap2::Mmap> {
    None
}

/// Count standard input.
///
/// A redirected regular file is mapped and goes through the chunked path;
/// a pipe is read to the end and counted in one unchunked pass.
fn count_stdin(options: &CountOptions) -> Result<FinalCount, WcError> {
    if let Some(mmap) = try_mmap_stdin() {
        debug!("stdin is a regular file, mapped {} bytes", mmap.len());
        return wc::count_source(&FileData::Mmap(mmap), options);
    }
    let data = read_stdin().map_err(|source| WcError::Read { offset: 0, source })?;
    debug!("stdin is a stream, read {} bytes", data.len());
    Ok(wc::merge(&[wc::count_slice(&data, options.mode)]))
}

fn count_file(path: &Path, options: &CountOptions) -> Result<FinalCount, WcError> {
    let file = open_noatime(path).map_err(|source| WcError::Probe { source })?;
    let meta = file
        .metadata()
        .map_err(|source| WcError::Probe { source })?;
    if meta.is_dir() {
        return Err(WcError::Probe {
            source: io::Error::new(io::ErrorKind::IsADirectory, "Is a directory"),
        });
    }
    wc::count_source(&file, options)
}

/// Error text in coreutils style: the bare OS message when there is one.
fn error_msg(e: &WcError) -> String {
    match e.io_error() {
        Some(io_err) => io_error_msg(io_err),
        None => e.to_string(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Warn
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

fn main() {
    pwc::common::reset_sigpipe();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // If no flags specified, default to lines + words + bytes.
    // If any flag is specified, only show the explicitly requested ones.
    let no_explicit = !cli.bytes && !cli.chars && !cli.words && !cli.lines;
    let show = ShowFlags {
        lines: cli.lines || no_explicit,
        words: cli.words || no_explicit,
        chars: cli.chars,
        bytes: cli.bytes || no_explicit,
    };

    let mut options = CountOptions {
        mode: if show.chars {
            CountMode::Chars
        } else {
            CountMode::Bytes
        },
        ..CountOptions::default()
    };
    if let Some(n) = cli.parallel {
        options.parallelism = n as usize;
    }
    if let Some(threshold) = cli.chunk_threshold {
        options.threshold = threshold;
    }
    debug!(
        "parallelism {}, single-chunk threshold {} bytes",
        options.parallelism, options.threshold
    );

    let files: Vec<String> = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };

    // Every named file must exist before any counting starts.
    for filename in files.iter().filter(|f| f.as_str() != "-") {
        if let Err(e) = std::fs::metadata(filename) {
            eprintln!("pwc: {}: {}", filename, io_error_msg(&e));
            process::exit(1);
        }
    }

    // Phase 1: Compute all counts
    let mut results: Vec<(FinalCount, String)> = Vec::new();
    let mut total = FinalCount::default();
    let mut had_error = false;
    let mut has_stdin = false;

    for filename in &files {
        let counted = if filename == "-" {
            has_stdin = true;
            count_stdin(&options)
        } else {
            count_file(Path::new(filename), &options)
        };

        match counted {
            Ok(counts) => {
                total += counts;
                let display_name = if filename == "-" {
                    String::new()
                } else {
                    filename.clone()
                };
                results.push((counts, display_name));
            }
            Err(e) => {
                let name = if filename == "-" {
                    "standard input"
                } else {
                    filename.as_str()
                };
                eprintln!("pwc: {}: {}", name, error_msg(&e));
                had_error = true;
            }
        }
    }

    // Phase 2: Compute column width
    let show_total = results.len() > 1;
    let num_output_rows = results.len() + show_total as usize;
    let min_width = if has_stdin && results.len() == 1 { 7 } else { 1 };

    let width = if show.columns() <= 1 && num_output_rows <= 1 {
        // Single value output: natural width
        let single_val = if show.lines {
            total.lines
        } else if show.words {
            total.words
        } else if show.chars {
            total.chars
        } else {
            total.bytes
        };
        num_width(single_val)
    } else {
        let max_val = [total.lines, total.words, total.chars, total.bytes]
            .into_iter()
            .max()
            .unwrap_or(0);
        num_width(max_val).max(min_width)
    };

    // Phase 3: Print results
    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(64 * 1024, stdout.lock());

    for (counts, name) in &results {
        print_counts(&mut out, counts, name, width, &show);
    }
    if show_total {
        print_counts(&mut out, &total, "total", width, &show);
    }

    let _ = out.flush();

    if had_error {
        process::exit(1);
    }
}

/// Number of decimal digits needed to display a value.
fn num_width(n: u64) -> usize {
    itoa::Buffer::new().format(n).len()
}

/// Print one row: newline, word, character, byte counts, then the name.
fn print_counts(out: &mut impl Write, counts: &FinalCount, filename: &str, width: usize, show: &ShowFlags) {
    let mut line = String::with_capacity(96);
    let mut buf = itoa::Buffer::new();

    let fields = [
        (show.lines, counts.lines),
        (show.words, counts.words),
        (show.chars, counts.chars),
        (show.bytes, counts.bytes),
    ];
    for (_, val) in fields.iter().filter(|(shown, _)| *shown) {
        if !line.is_empty() {
            line.push(' ');
        }
        let digits = buf.format(*val);
        for _ in digits.len()..width {
            line.push(' ');
        }
        line.push_str(digits);
    }

    if !filename.is_empty() {
        line.push(' ');
        line.push_str(filename);
    }
    line.push('\n');

    let _ = out.write_all(line.as_bytes());
}
