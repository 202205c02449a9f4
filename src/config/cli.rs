use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

#[derive(Debug, Clone, Parser)]
#[command(name = "vk-birthday-bot", version)]
#[command(about = "Posts today's birthday greetings to a VK group wall")]
#[command(
    long_about = "Finds group members whose birthday is today (UTC+7) and publishes a \
                  congratulation post with a picture on the group wall. Runs at most once per day."
)]
pub struct Cli {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Clear the daily lock and exit
    #[arg(long)]
    pub reset: bool,

    /// Show the daily lock state and exit
    #[arg(long)]
    pub status: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Reset,
    Status,
}

const SWITCHES: [&str; 9] = [
    "--reset",
    "--status",
    "--verbose",
    "-v",
    "--log-json",
    "--help",
    "-h",
    "--version",
    "-V",
];

impl Cli {
    /// `--reset` wins over `--status`; anything else runs the full flow.
    pub fn mode(&self) -> Mode {
        if self.reset {
            Mode::Reset
        } else if self.status {
            Mode::Status
        } else {
            Mode::Run
        }
    }

    fn try_parse_with_footer(args: &[String], footer: &str) -> Result<Self, clap::Error> {
        let matches = Self::command()
            .after_help(footer.to_string())
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Parses `args`, dropping arguments it does not recognise instead of
    /// failing, and returns the dropped ones so they can be logged once the
    /// logger is up. Help and version requests print and exit.
    pub fn parse_lenient<I, T>(args: I, footer: &str) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let (known, ignored) = match Self::try_parse_with_footer(&args, footer) {
            Ok(cli) => return (cli, Vec::new()),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(_) => split_known_args(&args),
        };

        let cli = Self::try_parse_with_footer(&known, footer)
            .or_else(|e| match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Err(e),
                _ => Self::try_parse_with_footer(&args[..args.len().min(1)], footer),
            })
            .unwrap_or_else(|e| e.exit());
        (cli, ignored)
    }
}

/// Splits `args` into the ones this CLI understands (program name first)
/// and the rest.
fn split_known_args(args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut iter = args.iter();

    if let Some(program) = iter.next() {
        kept.push(program.clone());
    }

    while let Some(arg) = iter.next() {
        if SWITCHES.contains(&arg.as_str()) || arg.starts_with("--config=") {
            kept.push(arg.clone());
        } else if arg == "--config" || arg == "-c" {
            match iter.next() {
                Some(value) => {
                    kept.push(arg.clone());
                    kept.push(value.clone());
                }
                None => ignored.push(arg.clone()),
            }
        } else {
            ignored.push(arg.clone());
        }
    }

    (kept, ignored)
}
