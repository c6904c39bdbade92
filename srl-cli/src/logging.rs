use stderrlog::Timestamp;

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[arg(short, long)]
    pub quiet: bool,

    /// Turn debugging information on (-v, -vv, -vvv)
    #[arg(short, long = "log-verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Enable timestamped logging.
    #[arg(long)]
    pub ts: bool,
}

impl LogArgs {
    /// Install the stderr logger; `default` is used when no `-v` is given.
    pub fn setup_logging(&self, default: u8) -> Result<(), log::SetLoggerError> {
        let level = if self.verbose > 0 {
            self.verbose
        } else {
            default
        };

        let log_level = match level {
            0 => stderrlog::LogLevelNum::Off,
            1 => stderrlog::LogLevelNum::Error,
            2 => stderrlog::LogLevelNum::Warn,
            3 => stderrlog::LogLevelNum::Info,
            4 => stderrlog::LogLevelNum::Debug,
            _ => stderrlog::LogLevelNum::Trace,
        };

        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(log_level)
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()
    }
}
