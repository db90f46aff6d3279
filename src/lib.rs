//! Stardew Valley save manager core
//!
//! Lists saves on the PC and on an adb-attached Android device, copies them
//! between the two, snapshots the PC saves and deletes saves. Every entry
//! point a front end needs lives on [`manager::SaveManager`].

pub mod backend;
pub mod backup;
pub mod bridge;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod deletion;
pub mod error;
pub mod manager;
pub mod paths;
pub mod transfer;
pub mod util;
pub mod worker;

pub use backend::{Backend, BackendKind, OperationReport};
pub use cancel::CancelToken;
pub use catalog::{CatalogScan, Diagnostic, FullCatalog, SaveRecord};
pub use error::{SaveError, SaveResult};
pub use manager::SaveManager;
pub use transfer::{TransferError, TransferFailure};
