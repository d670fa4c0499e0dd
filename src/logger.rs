use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Logging switches taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub log_file: Option<PathBuf>,
}

impl LogOptions {
    /// `--verbose` wins over `--quiet`; otherwise `RUST_LOG` or `info`.
    fn filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        }
    }
}

pub fn init(options: &LogOptions) -> std::io::Result<()> {
    let env_filter = options.filter();

    let is_debug = env_filter.to_string().contains("debug");
    let span_events = || if is_debug {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events());

    let file_layer = match &options.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(fmt::time::uptime())
                    .with_span_events(span_events())
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_quiet() {
        let options = LogOptions { verbose: true, quiet: true, log_file: None };
        assert_eq!(options.filter().to_string(), "debug");
    }

    #[test]
    fn test_quiet_disables_output() {
        let options = LogOptions { quiet: true, ..LogOptions::default() };
        assert_eq!(options.filter().to_string(), "off");
    }
}
