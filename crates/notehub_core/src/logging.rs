//! Process-wide logging bootstrap and its safety rules.
//!
//! # Responsibility
//! - Bring up rolling file logs once per process and keep the handle alive.
//! - Give core code a place to emit metadata-only diagnostic events.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Bringing up logging never panics.
//! - Re-initialization with a different level or directory is rejected.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "notehub";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 200;
const KNOWN_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Turns on file logging at `level` under `log_dir`.
///
/// `Ok(())` means logging is active; failures come back as a readable
/// message suitable for stderr.
///
/// # Invariants
/// - Repeat calls with the active level and directory are idempotent.
/// - Repeat calls with any other level or directory are rejected.
/// - Never panics, even on bad input.
///
/// # Errors
/// - Returns an error for an unknown `level`.
/// - Returns an error when `log_dir` is blank, relative, or cannot be created.
/// - Returns an error when the logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, log_dir.clone()))?;

    // When logging is already up the closure never ran; the caller's config
    // has to agree with the active one.
    if state.log_dir != log_dir {
        return Err(format!(
            "logging already active in `{}`; cannot move to `{}`",
            state.log_dir.display(),
            log_dir.display()
        ));
    }
    if state.level != level {
        return Err(format!(
            "logging already active at level `{}`; cannot change to `{}`",
            state.level, level
        ));
    }

    Ok(())
}

fn start_logger(level: &'static str, log_dir: PathBuf) -> Result<LoggingState, String> {
    std::fs::create_dir_all(&log_dir).map_err(|err| {
        format!(
            "could not create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("log backend rejected level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // detailed_format carries timestamp + source location, which the
        // log tooling expects as its leading columns.
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("log backend failed to start: {err}"))?;

    install_panic_hook_once();

    info!(
        "event=core_start module=core status=ok platform={} build_mode={} version={}",
        std::env::consts::OS,
        build_mode(),
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=logging_ready module=core status=ok level={} log_dir={}",
        level,
        log_dir.display()
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: logger,
    })
}

/// Reports what the logger is currently doing.
///
/// `None` before initialization, `(level, log_dir)` once logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// Level to use when the caller does not name one.
///
/// `debug` builds log at `debug`, `release` builds at `info`.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    let lowered = level.trim().to_ascii_lowercase();
    let wanted = if lowered == "warning" {
        "warn"
    } else {
        lowered.as_str()
    };
    for known in KNOWN_LEVELS {
        if wanted == known {
            return Ok(known);
        }
    }
    Err(format!(
        "unknown log level `{level}` (use one of trace, debug, info, warn, error)"
    ))
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log directory cannot be blank".to_string());
    }
    let path = PathBuf::from(trimmed);
    if !path.is_absolute() {
        return Err(format!(
            "log directory must be an absolute path, got `{trimmed}`"
        ));
    }
    Ok(path)
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Panic payloads can carry user-controlled text; log a clipped,
        // newline-free summary only.
        let location = match info.location() {
            Some(loc) => format!("{}:{}", loc.file(), loc.line()),
            None => "unknown".to_string(),
        };
        error!(
            "event=panic module=core status=error location={location} payload={}",
            describe_panic_payload(info)
        );
        chained(info);
    }));
}

fn describe_panic_payload(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string());
    clip_log_text(&text, MAX_PANIC_PAYLOAD_CHARS)
}

fn clip_log_text(value: &str, max_chars: usize) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    match single_line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &single_line[..cut]),
        None => single_line,
    }
}

#[cfg(test)]
mod tests {
    use super::{clip_log_text, init_logging, logging_status, normalize_level, normalize_log_dir};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock is past the unix epoch")
            .as_nanos();
        let leaf = format!("notehub-logging-{suffix}-{}-{nanos}", std::process::id());
        std::env::temp_dir().join(leaf)
    }

    #[test]
    fn normalize_level_accepts_known_spellings() {
        for (given, want) in [("TRACE", "trace"), ("Info", "info"), (" warning ", "warn")] {
            assert_eq!(normalize_level(given).expect("level should normalize"), want);
        }
    }

    #[test]
    fn normalize_level_rejects_unknown_spellings() {
        let error = normalize_level("loud").expect_err("unknown level must be rejected");
        assert!(error.contains("unknown log level"));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_and_blank_paths() {
        let relative = normalize_log_dir("var/log/notehub").expect_err("relative path");
        assert!(relative.contains("absolute"));

        let blank = normalize_log_dir("   ").expect_err("blank path");
        assert!(blank.contains("blank"));
    }

    #[test]
    fn clip_log_text_flattens_and_caps_long_text() {
        let clipped = clip_log_text("first\nsecond\rthird", 8);
        assert_eq!(clipped, "first se...");

        let untouched = clip_log_text("short", 8);
        assert_eq!(untouched, "short");
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_reconfiguration() {
        let log_dir = unique_temp_dir("primary");
        let log_dir_str = log_dir.to_str().expect("temp path is utf-8").to_string();
        let other_dir = unique_temp_dir("other");
        let other_dir_str = other_dir.to_str().expect("temp path is utf-8").to_string();

        init_logging("info", &log_dir_str).expect("first call brings logging up");
        init_logging("info", &log_dir_str).expect("repeat call with the active config");

        let level_error =
            init_logging("debug", &log_dir_str).expect_err("a different level must be refused");
        assert!(level_error.contains("cannot change"));

        let dir_error =
            init_logging("info", &other_dir_str).expect_err("different directory must be refused");
        assert!(dir_error.contains("cannot move"));

        let status = logging_status().expect("logging is active");
        assert_eq!(status, ("info", log_dir));
    }
}
