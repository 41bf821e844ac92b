//! Structured logging with box-drawing decorations.
//!
//! Every line is written to stdout. When file logging is started with
//! [`Log::start_file_logging`], a background writer thread also receives a
//! copy of each line, stripped of ANSI color codes and prefixed with a UTC
//! timestamp, so the board keeps a persistent record when run as a service.
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: opens a new conceptual block (phase changes,
//!   startup steps). Prints an empty pipe `┃` for spacing, then `┣ message`.
//! - **`log_decorated!`**: a line that belongs to the current block (`┣ message`).
//! - **`log_indented!`**: nested detail under a block (`┃   message`).
//! - **`log_pipe!`**: a single empty `┃` line, used before a semantic message
//!   that starts its own block.
//! - **`log_version!`** / **`log_end!`**: the startup header and the final
//!   termination marker.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`**:
//!   semantic messages with a colored `[LEVEL]` tag.
//! - **`log_error_exit!`**: closes the log flow with `┗[ERROR]`.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Copy of every line for the log file, when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Line(String),
    Shutdown,
}

/// Main logging interface. The macros below are the intended entry points.
pub struct Log;

impl Log {
    /// Enable or disable logging, e.g. to keep test output quiet.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Start copying log output to `file_path` (appending).
    ///
    /// The returned guard flushes and joins the writer thread when dropped;
    /// keep it alive for the lifetime of the process.
    pub fn start_file_logging(file_path: &str) -> anyhow::Result<LoggerGuard> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .map_err(|e| anyhow::anyhow!("Failed to open log file {file_path}: {e}"))?;

        let (tx, rx) = channel();
        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("File logging already started"))?;

        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(LogMessage::Line(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Write one formatted line. `decoration` is everything before the message.
    #[doc(hidden)]
    pub fn emit(decoration: &str, message: &str) {
        if !Self::is_enabled() {
            return;
        }
        let line = format!("{decoration}{message}\n");
        print!("{line}");
        let _ = std::io::stdout().flush();

        if let Some(tx) = LOG_CHANNEL.get() {
            let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%SZ");
            let _ = tx.send(LogMessage::Line(format!(
                "[{stamp}] {}",
                strip_ansi_codes(&line)
            )));
        }
    }
}

/// Guard for file logging that flushes on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` color sequences.
pub(crate) fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// # Logging Macros

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣ ", &format!($($arg)+))
    };
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┃   ", &format!($($arg)+))
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::common::logger::Log::emit("┃", "")
    };
}

/// Start a new block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┃\n┣ ", &format!($($arg)+))
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::common::logger::Log::emit(
            "┏ ",
            &format!("metarmap v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::common::logger::Log::emit("╹", "")
    };
}

/// Log a warning with a yellow tag.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣[\x1b[33mWARNING\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an error with a red tag.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣[\x1b[31mERROR\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an error that terminates the log flow.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┃\n┗[\x1b[31mERROR\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log an informational message with a green tag.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣[\x1b[32mINFO\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log a debug message. Callers gate these on the debug flag.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣[\x1b[32mDEBUG\x1b[0m] ", &format!($($arg)+))
    };
}

/// Log a critical message with a red tag.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::common::logger::Log::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", &format!($($arg)+))
    };
}
