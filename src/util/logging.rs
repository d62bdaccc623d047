use std::path::{Path, PathBuf};

use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

pub fn init() -> anyhow::Result<()> {
    init_in(&log_dir())
}

/// Start file logging under `log_dir`. Later calls are no-ops.
pub fn init_in(log_dir: &Path) -> anyhow::Result<()> {
    LOGGER.get_or_try_init(|| {
        std::fs::create_dir_all(log_dir)?;
        let handle = Logger::try_with_env_or_str("info")?
            .duplicate_to_stdout(Duplicate::Info)
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir)
                    .basename("recipe-reader"),
            )
            .rotate(
                Criterion::AgeOrSize(Age::Day, 10_000_000),
                Naming::Numbers,
                Cleanup::KeepLogFiles(7),
            )
            .start()?;
        anyhow::Ok(handle)
    })?;
    Ok(())
}

fn log_dir() -> PathBuf {
    PathBuf::from("logs")
}
