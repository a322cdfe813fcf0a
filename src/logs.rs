use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};
use std::path::Path;

/// Logs go to a rotating file under `log_dir` and to stderr.
pub fn init(log_dir: &str) -> Result<()> {
    let path = Path::new(log_dir).join("logs/trailline.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    CombinedLogger::init(vec![
        WriteLogger::new(LevelFilter::Info, config.clone(), log),
        TermLogger::new(
            LevelFilter::Info,
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    ])?;
    Ok(())
}
