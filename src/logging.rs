use std::error::Error;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

/// Install the global logger.
///
/// Without a log file `env_logger` is used and `RUST_LOG` wins over `level`.
/// With one, terminal and file output are combined through `simplelog`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_env("RUST_LOG")
                .try_init()?;
        }
        Some(path) => {
            let config = ConfigBuilder::new()
                .set_target_level(LevelFilter::Error)
                .set_thread_level(LevelFilter::Off)
                .build();
            let file = File::create(path)?;
            CombinedLogger::init(vec![
                TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(level, config, file),
            ])?;
        }
    }
    Ok(())
}
