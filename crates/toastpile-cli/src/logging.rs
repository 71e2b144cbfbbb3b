use toastpile_shared::config;

/// Rotate the log file once it grows past 5 MB.
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

/// Install the global logger. Logs always go to stderr so stdout stays
/// machine-readable; `to_file` also appends to the data-dir log.
pub fn init(verbosity: u8, to_file: bool) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                humantime::format_rfc3339_seconds(std::time::SystemTime::now()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if to_file {
        let log_path = config::log_path();
        if let Some(dir) = log_path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(meta) = std::fs::metadata(&log_path) {
            if meta.len() > MAX_LOG_SIZE {
                let _ = std::fs::rename(&log_path, log_path.with_extension("log.old"));
            }
        }
        match fern::log_file(&log_path) {
            Ok(file) => dispatch = dispatch.chain(file),
            Err(e) => eprintln!("Failed to open log file {}: {}", log_path.display(), e),
        }
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to initialize logger: {}", e);
    }
}
