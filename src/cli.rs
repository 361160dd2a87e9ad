use std::path::PathBuf;

use clap::Parser;

use crate::compress::{CompressOptions, DEFAULT_LEVEL};

#[derive(Parser, Debug)]
#[command(name = "rgzip")]
#[command(version)]
#[command(
    about = "Compress or expand files in gzip format, or the first entry of a zip file",
    long_about = None
)]
#[command(after_help = "Examples:\n  \
  rgzip notes.txt               replace notes.txt with notes.txt.gz\n  \
  rgzip -d notes.txt.gz         restore notes.txt\n  \
  rgzip -dc archive.zip | less  show the first entry of a zip file\n  \
  rgzip -t *.gz                 check integrity of compressed files")]
pub struct Cli {
    /// Files to process; standard input when none or "-"
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Decompress
    #[arg(short = 'd', long = "decompress", visible_alias = "uncompress")]
    pub decompress: bool,

    /// Write on standard output, keep original files unchanged
    #[arg(short = 'c', long = "stdout", visible_alias = "to-stdout")]
    pub stdout: bool,

    /// Keep (don't delete) input files
    #[arg(short = 'k', long = "keep")]
    pub keep: bool,

    /// Force overwrite of output file
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Test compressed file integrity
    #[arg(short = 't', long = "test")]
    pub test: bool,

    /// Do not save the original name and timestamp
    #[arg(short = 'n', long = "no-name")]
    pub no_name: bool,

    /// Compression level, 1 (fastest) to 9 (best)
    #[arg(short = 'l', long = "level", value_name = "N",
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: Option<u32>,

    /// Compress faster (level 1)
    #[arg(short = '1', long = "fast")]
    pub fast: bool,

    /// Compress better (level 9)
    #[arg(short = '9', long = "best")]
    pub best: bool,

    /// Make rsync-friendly archives
    #[arg(long = "rsyncable")]
    pub rsyncable: bool,

    /// Use suffix SUF on compressed files
    #[arg(short = 'S', long = "suffix", value_name = "SUF", default_value = ".gz",
          value_parser = parse_suffix)]
    pub suffix: String,

    /// Verbose mode (-vv => more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', long = "quiet", action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    /// Decompress or test.
    pub fn is_decoding(&self) -> bool {
        self.decompress || self.test
    }

    pub fn level(&self) -> u32 {
        match (self.level, self.fast, self.best) {
            (Some(level), _, _) => level,
            (None, _, true) => 9,
            (None, true, false) => 1,
            (None, false, false) => DEFAULT_LEVEL,
        }
    }

    /// `log` verbosity for stderrlog: warnings by default, errors only with
    /// `-q`.
    pub fn log_verbosity(&self) -> usize {
        if self.quiet > 0 {
            0
        } else {
            1 + self.verbose as usize
        }
    }

    /// Options for one file; name and mtime are filled in by the caller.
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            level: self.level(),
            rsyncable: self.rsyncable,
            ..Default::default()
        }
    }
}

fn parse_suffix(suffix: &str) -> Result<String, String> {
    if suffix.is_empty() || suffix.contains(std::path::MAIN_SEPARATOR) {
        return Err(format!("invalid suffix '{suffix}'"));
    }
    Ok(suffix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_flags() {
        let cli = Cli::parse_from(["rgzip", "-9", "a"]);
        assert_eq!(cli.level(), 9);
        let cli = Cli::parse_from(["rgzip", "--fast", "a"]);
        assert_eq!(cli.level(), 1);
        let cli = Cli::parse_from(["rgzip", "-l", "3", "-9"]);
        assert_eq!(cli.level(), 3);
        let cli = Cli::parse_from(["rgzip"]);
        assert_eq!(cli.level(), DEFAULT_LEVEL);
        assert!(Cli::try_parse_from(["rgzip", "-l", "12"]).is_err());
    }

    #[test]
    fn modes() {
        let cli = Cli::parse_from(["rgzip", "-dc", "-S", ".z", "x.z"]);
        assert!(cli.is_decoding());
        assert!(cli.stdout);
        assert_eq!(cli.suffix, ".z");
        assert_eq!(cli.files, vec![PathBuf::from("x.z")]);

        let cli = Cli::parse_from(["rgzip", "-t", "-vv", "--rsyncable"]);
        assert!(cli.is_decoding());
        assert_eq!(cli.log_verbosity(), 3);
        assert!(cli.compress_options().rsyncable);

        let cli = Cli::parse_from(["rgzip", "-q", "-v"]);
        assert_eq!(cli.log_verbosity(), 0);
    }

    #[test]
    fn empty_suffix_is_rejected() {
        assert!(Cli::try_parse_from(["rgzip", "-S", "", "a"]).is_err());
        assert!(Cli::try_parse_from(["rgzip", "--suffix=", "a"]).is_err());
        assert!(Cli::try_parse_from(["rgzip", "-S", "x/y", "a"]).is_err());
        let cli = Cli::parse_from(["rgzip", "-S", "_z", "a"]);
        assert_eq!(cli.suffix, "_z");
    }
}
