//! Signal handling for graceful shutdown.
//!
//! A background thread turns SIGINT, SIGTERM and SIGHUP into a
//! [`SignalMessage::Shutdown`] on a channel and clears the shared `running`
//! flag. Every wait in the control loop goes through [`SignalState::wait`],
//! which blocks on that channel, so a signal ends any sleep immediately.
//! Signals arriving while shutdown is already under way are logged and
//! posted again; the thread keeps listening until the loop has finished.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Messages posted by the signal thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// SIGINT, SIGTERM or SIGHUP
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once shutdown has been requested
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    pub signal_sender: Sender<SignalMessage>,
}

/// Cloneable handle that requests shutdown from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    sender: Sender<SignalMessage>,
}

impl ShutdownHandle {
    /// Clear the running flag and wake the loop. Returns `false` once the
    /// receiving side is gone, i.e. the loop has already finished.
    pub fn request_shutdown(&self) -> bool {
        self.running.store(false, Ordering::SeqCst);
        self.sender.send(SignalMessage::Shutdown).is_ok()
    }
}

impl SignalState {
    /// State without any OS signal registration.
    ///
    /// Shutdown can only be requested through [`SignalState::shutdown_handle`].
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: self.running.clone(),
            sender: self.signal_sender.clone(),
        }
    }

    /// Block for up to `timeout`. Returns `true` when shutdown was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        if !self.is_running() {
            return true;
        }

        match self.signal_receiver.recv_timeout(timeout) {
            Ok(SignalMessage::Shutdown) => {
                self.running.store(false, Ordering::SeqCst);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                !self.is_running()
            }
        }
    }
}

/// Register SIGINT, SIGTERM and SIGHUP and spawn the signal thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let handle = state.shutdown_handle();

    thread::spawn(move || {
        let mut shutdown_requested = false;

        for sig in signals.forever() {
            log_pipe!();
            if shutdown_requested {
                log_info!("Received signal {sig}, shutdown already in progress");
            } else {
                log_info!("{}", shutdown_message(sig, debug_enabled));
                shutdown_requested = true;
            }

            if !handle.request_shutdown() {
                break;
            }
        }
    });

    Ok(state)
}

fn shutdown_message(sig: i32, debug_enabled: bool) -> &'static str {
    match sig {
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), shutting down...",
        SIGINT => "Received interrupt signal, shutting down...",
        SIGTERM => "Received termination request, shutting down...",
        SIGHUP => "Received hangup signal, shutting down...",
        _ => "Received shutdown signal, shutting down...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use serial_test::serial;
    use signal_hook::low_level::raise;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out_while_running() {
        let state = SignalState::detached();
        assert!(!state.wait(Duration::from_millis(20)));
        assert!(state.is_running());
    }

    #[test]
    fn test_shutdown_wakes_a_long_wait() {
        let state = SignalState::detached();
        let handle = state.shutdown_handle();

        let started = Instant::now();
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.request_shutdown();
        });

        assert!(state.wait(Duration::from_secs(60)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!state.is_running());
        waker.join().unwrap();
    }

    #[test]
    fn test_wait_after_shutdown_returns_immediately() {
        let state = SignalState::detached();
        state.shutdown_handle().request_shutdown();
        assert!(state.wait(Duration::from_secs(60)));
        assert!(state.wait(Duration::from_secs(60)));
    }

    #[test]
    fn test_request_shutdown_reports_finished_loop() {
        let state = SignalState::detached();
        let handle = state.shutdown_handle();
        assert!(handle.request_shutdown());
        drop(state);
        assert!(!handle.request_shutdown());
    }

    #[test]
    fn test_shutdown_messages() {
        assert_eq!(
            shutdown_message(SIGINT, true),
            "Received SIGINT (Ctrl+C), shutting down..."
        );
        assert_eq!(
            shutdown_message(SIGINT, false),
            "Received interrupt signal, shutting down..."
        );
        assert_eq!(
            shutdown_message(SIGHUP, false),
            "Received hangup signal, shutting down..."
        );
    }

    #[test]
    #[serial]
    fn test_every_signal_is_handled() {
        Log::set_enabled(false);
        let state = setup_signal_handler(false).unwrap();

        raise(SIGHUP).unwrap();
        assert!(state.wait(Duration::from_secs(5)));
        assert!(!state.is_running());

        // A second signal during shutdown still reaches the loop
        raise(SIGHUP).unwrap();
        assert_eq!(
            state.signal_receiver.recv_timeout(Duration::from_secs(5)),
            Ok(SignalMessage::Shutdown)
        );
    }
}
