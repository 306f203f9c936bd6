//! Background conversion.
//!
//! This module provides:
//!
//! - [`ConversionTask`] - Runs [`convert`](crate::convert) on a worker thread
//!   and delivers the result through a channel
//! - [`CancellationToken`] - Shared flag checked between pipeline stages
//!
//! # Example
//!
//! ```ignore
//! let mut task = ConversionTask::spawn(options)?;
//! loop {
//!     if let Some(result) = task.try_result() {
//!         break result;
//!     }
//!     std::thread::sleep(Duration::from_millis(50));
//! }
//! ```

mod cancellation;

pub use cancellation::{CancellationToken, Cancelled};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use crate::convert::{ConversionReport, ConvertError, ConvertOptions, convert_with_cancel};

type TaskResult = Result<ConversionReport, ConvertError>;

/// Handle to a conversion running on its own thread.
///
/// The result can be polled with [`try_result`](Self::try_result) or
/// awaited with [`wait`](Self::wait). Dropping the handle detaches the
/// worker; the conversion still runs to completion.
pub struct ConversionTask {
    receiver: mpsc::Receiver<TaskResult>,
    token: CancellationToken,
    handle: Option<thread::JoinHandle<()>>,
}

impl ConversionTask {
    /// Start converting on a new thread.
    pub fn spawn(options: ConvertOptions) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let handle = thread::Builder::new()
            .name("csv-convert".into())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    convert_with_cancel(&options, &worker_token)
                }))
                .unwrap_or_else(|payload| Err(ConvertError::WorkerPanicked(panic_message(payload))));
                // The receiver may already be gone
                let _ = sender.send(result);
            })?;

        Ok(Self {
            receiver,
            token,
            handle: Some(handle),
        })
    }

    /// Request cancellation. The worker stops at its next stage boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Attempt to retrieve the result without blocking.
    ///
    /// Returns `None` while the conversion is still running. The result is
    /// delivered once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<TaskResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                if self.handle.is_none() {
                    return None;
                }
                self.join();
                Some(Err(ConvertError::WorkerPanicked(
                    "worker exited without a result".into(),
                )))
            }
        }
    }

    /// Block until the conversion completes.
    pub fn wait(mut self) -> TaskResult {
        let result = self.receiver.recv().unwrap_or_else(|_| {
            Err(ConvertError::WorkerPanicked(
                "worker exited without a result".into(),
            ))
        });
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("conversion worker panicked after sending its result");
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
