// SPDX-License-Identifier: GPL-3.0-only
//! Paced frame-producing threads
//!
//! Backends that generate frames themselves (rather than receiving them from
//! a driver) run a [`FrameLoop`] while their session is running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Action returned by the loop callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// A thread calling a tick closure at a fixed interval until stopped
///
/// # Example
///
/// ```ignore
/// let frames = FrameLoop::start("virtual-preview", VIRTUAL_FRAME_INTERVAL, move |sequence| {
///     sink.frame_ready(render(sequence));
///     LoopAction::Continue
/// });
///
/// // Later, stop the loop
/// frames.stop();
/// ```
pub struct FrameLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl FrameLoop {
    /// Start calling `tick` every `interval` on a new thread
    ///
    /// `tick` receives a sequence number starting at zero. Time spent inside
    /// `tick` is subtracted from the sleep so the pace stays close to `interval`.
    pub fn start<F>(name: &str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut(u64) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, interval_ms = interval.as_millis() as u64, "Starting frame loop");

        let thread_handle = thread::spawn(move || {
            let mut sequence = 0u64;

            loop {
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                let started = Instant::now();
                if tick(sequence) == LoopAction::Stop {
                    debug!(name = %name_clone, "Loop requested stop");
                    break;
                }
                sequence += 1;

                if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }

            debug!(name = %name_clone, frames = sequence, "Frame loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting for the thread
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            // A tick running on this very thread (a callback that stops its own
            // loop) must not join itself.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Frame loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Frame loop thread finished");
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_loop_stops_itself() {
        let counter = Arc::new(AtomicU64::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut frames = FrameLoop::start("test-loop", Duration::ZERO, move |sequence| {
            counter_clone.store(sequence, Ordering::SeqCst);
            if sequence >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        });

        frames.join();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert!(!frames.is_running());
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU64::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut frames = FrameLoop::start("test-loop", Duration::from_millis(5), move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            LoopAction::Continue
        });

        thread::sleep(Duration::from_millis(50));
        frames.stop();
        let after_stop = counter.load(Ordering::SeqCst);
        assert!(after_stop > 0);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_is_running_until_dropped() {
        let frames = FrameLoop::start("test-running", Duration::from_millis(10), |_| {
            LoopAction::Continue
        });

        assert!(frames.is_running());
        drop(frames);
    }
}
