//! Cooperative cancellation shared between the caller and a running operation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SaveError, SaveResult};

/// Cloneable flag checked by long-running backend calls.
///
/// Bridge commands poll it while the child process runs; local tree walks
/// check it between items. Cancelling never rolls back work already done.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> SaveResult<()> {
        if self.is_cancelled() {
            Err(SaveError::Cancelled)
        } else {
            Ok(())
        }
    }
}
