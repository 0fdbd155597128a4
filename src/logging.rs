use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// Where log records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to the cache log file; used while the alternate screen is up
    File,
}

pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edobonsai")
        .join("edobonsai.log")
}

/// Install the global logger. Level comes from `RUST_LOG` (default `info`).
///
/// If the log file cannot be opened, records are dropped rather than
/// written over the scene.
pub fn init(target: LogTarget) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    match target {
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
        LogTarget::File => {
            let path = log_path();
            let file = path
                .parent()
                .map(fs::create_dir_all)
                .transpose()
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match file {
                Ok(file) => {
                    builder.target(Target::Pipe(Box::new(file)));
                }
                Err(_) => {
                    builder.filter_level(log::LevelFilter::Off);
                }
            }
        }
    }

    // a second init (e.g. from tests) keeps the first logger
    let _ = builder.try_init();
}
