//! Cancellable renewal timers.
//!
//! Each live subscription owns one [`RenewalTask`]: a named thread that
//! sleeps on a cancellation channel and runs the renewal callback whenever
//! the delay elapses. Dropping the task disconnects the channel, which wakes
//! the thread and ends it; the thread is never joined, so a task may be
//! dropped from its own callback.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Handle to a scheduled renewal
#[derive(Debug)]
pub struct RenewalTask {
    sid: String,
    cancel: mpsc::Sender<()>,
}

impl RenewalTask {
    /// Start a renewal loop for `sid`
    ///
    /// `renew` runs after `first_delay` and returns the delay until the next
    /// run, or `None` to stop.
    ///
    /// # Errors
    /// The OS refused to start the timer thread.
    pub fn spawn<F>(sid: impl Into<String>, first_delay: Duration, renew: F) -> io::Result<Self>
    where
        F: FnMut() -> Option<Duration> + Send + 'static,
    {
        let sid = sid.into();
        let builder = thread::Builder::new().name(format!("dlna-renewal-{}", sid));
        Self::start(builder, sid, first_delay, renew)
    }

    fn start<F>(builder: thread::Builder, sid: String, first_delay: Duration, mut renew: F) -> io::Result<Self>
    where
        F: FnMut() -> Option<Duration> + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let thread_sid = sid.clone();

        builder.spawn(move || {
            let mut delay = first_delay;
            loop {
                match cancelled.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) => match renew() {
                        Some(next) => delay = next,
                        None => break,
                    },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!(sid = %thread_sid, "renewal task finished");
        })?;

        Ok(Self { sid, cancel })
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Stop the loop; a renewal already running completes first
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_task_fires_until_stopped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let (done_tx, done_rx) = mpsc::channel();

        let _task = RenewalTask::spawn("sid-1", Duration::from_millis(5), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 3 {
                let _ = done_tx.send(());
                None
            } else {
                Some(Duration::from_millis(5))
            }
        })
        .unwrap();

        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_drop_cancels_before_first_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let task = RenewalTask::spawn("sid-2", Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Duration::from_millis(50))
        })
        .unwrap();
        assert_eq!(task.sid(), "sid-2");
        drop(task);

        thread::sleep(Duration::from_millis(120));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_explicit_cancel() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let task = RenewalTask::spawn("sid-3", Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Duration::from_millis(50))
        })
        .unwrap();
        task.cancel();

        thread::sleep(Duration::from_millis(120));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    // More stack than a 64-bit address space can map
    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_thread_start_failure_is_returned() {
        let builder = thread::Builder::new().stack_size(1 << 48);

        let result = RenewalTask::start(builder, "sid-4".to_string(), Duration::from_millis(5), || None);

        assert!(result.is_err());
    }
}
