use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::generator::compose_charset;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "zipcrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recover passwords of encrypted ZIP/RAR archives")]
#[command(
    long_about = "Zipcrack tests candidate passwords against an encrypted ZIP or RAR archive \
                  until extraction succeeds. Candidates come from a wordlist, a brute-force \
                  charset, or both (wordlist first)."
)]
#[command(before_help = "🔓 Zipcrack - ZIP/RAR Password Recovery")]
#[command(after_help = "EXAMPLES:\n  \
    zipcrack -e secret.zip -W passwords.txt -d output\n  \
    zipcrack -e secret.zip -l -n -L 4\n  \
    zipcrack -e secret.rar -W passwords.txt -l -n -L 5 --show-every 1000\n  \
    zipcrack -e secret.zip -c 'abc123' -L 6 --output-format json\n\n\
    Use this tool only on archives you are authorized to open.")]
pub struct Cli {
    /// Archive to attack (.zip or .rar)
    #[arg(short = 'e', long, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Extraction destination directory
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    pub dest: PathBuf,

    /// Wordlist with one candidate per line, tried before brute force
    #[arg(short = 'W', long, value_name = "PATH")]
    pub wordlist: Option<PathBuf>,

    /// Include lowercase letters a-z in the brute-force charset
    #[arg(short = 'l', long)]
    pub lower: bool,

    /// Include uppercase letters A-Z in the brute-force charset
    #[arg(short = 'u', long)]
    pub upper: bool,

    /// Include digits 0-9 in the brute-force charset
    #[arg(short = 'n', long)]
    pub numbers: bool,

    /// Include punctuation characters in the brute-force charset
    #[arg(short = 's', long)]
    pub special: bool,

    /// Custom charset, overrides the class flags entirely
    #[arg(short = 'c', long, value_name = "CHARS")]
    pub custom: Option<String>,

    /// Exact brute-force password length
    #[arg(short = 'L', long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
    pub length: u64,

    /// Progress report cadence, in attempts
    #[arg(long, value_name = "N")]
    pub show_every: Option<u64>,

    /// Per-probe timeout in seconds for external extraction tools
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use external tools (7z/unrar) even for ZIP archives
    #[arg(long)]
    pub prefer_external: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for messages and the final result
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Print the available options with usage examples and exit
    #[arg(short = 'o', long)]
    pub options: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;
        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;
        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            show_every: self.show_every,
            timeout: self.timeout,
            prefer_external: self.prefer_external,
        }
    }

    /// A brute-force phase runs when any charset flag was given.
    pub fn brute_force_requested(&self) -> bool {
        self.lower || self.upper || self.numbers || self.special || self.custom.is_some()
    }

    pub fn charset(&self) -> Vec<char> {
        compose_charset(
            self.lower,
            self.upper,
            self.numbers,
            self.special,
            self.custom.as_deref(),
        )
    }
}

pub fn print_options_and_examples() {
    println!(
        "\
Options:
  -e, --archive <PATH>     Archive to attack (.zip or .rar)
  -d, --dest <PATH>        Extraction destination directory (default: .)
  -W, --wordlist <PATH>    Candidate passwords, one per line (tried first)
  -l, --lower              Include lowercase a-z
  -u, --upper              Include uppercase A-Z
  -n, --numbers            Include digits 0-9
  -s, --special            Include punctuation characters
  -c, --custom <CHARS>     Custom charset (overrides the class flags)
  -L, --length <N>         Exact brute-force length (default: 4)
      --show-every <N>     Progress report cadence in attempts (default: 200)
      --timeout <SECS>     Per-probe timeout for external tools (default: 30)
      --prefer-external    Use external tools even for ZIP archives
      --config <PATH>      TOML configuration file
      --output-format <F>  human | json | plain
  -o, --options            Show this message
  -v, --verbose            More output (-vv for probe-level detail)
  -q, --quiet              Less output

Exit codes:
  0    password found
  1    fatal error (bad configuration, missing file, no tool)
  2    search exhausted without a match
  130  cancelled with Ctrl+C

Examples:
  zipcrack -e secret.zip -W passwords.txt -d output
  zipcrack -e secret.zip -l -n -L 4
  zipcrack -e secret.rar -W passwords.txt -l -n -L 5 --show-every 1000"
    );
}
