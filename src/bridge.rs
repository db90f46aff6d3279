//! Command bridge to the Android device (adb)
//!
//! The remote saves directory is never mounted; every interaction is an
//! out-of-process `adb` invocation.
//!
//! ## Module Structure
//! - `types.rs`: BridgeOutput, AttachedDevice
//! - `pure.rs`: Pure parsers for `adb devices`, `ls -1 -p`, `stat -c %y` output and shell quoting
//! - `operations.rs`: AdbBridge, the timeout-bounded process runner

mod operations;
mod pure;
mod types;

#[cfg(test)]
pub(crate) mod fake;

use crate::cancel::CancelToken;
use crate::error::SaveResult;

// Re-export types
pub use types::{AttachedDevice, BridgeOutput};

// Re-export operations
pub use operations::AdbBridge;

// Re-export pure functions
pub use pure::{
    parse_attached_devices, parse_directory_listing, parse_stat_timestamp, remote_join,
    shell_quote,
};

/// Runs one bridge command and waits for it, honouring cancellation.
///
/// A non-zero exit status is not an error at this level; callers decide how
/// to surface it through `BridgeOutput::success`.
pub trait BridgeRunner: Send + Sync {
    fn run(&self, args: &[&str], cancel: &CancelToken) -> SaveResult<BridgeOutput>;
}
