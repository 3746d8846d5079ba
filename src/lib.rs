//! Unofficial channel memory backup and restore for the Alinco DJ-X100
//! wideband receiver.
//!
//! The radio exposes a line-oriented control protocol over its USB
//! serial port. [`backup`] streams the channel memory region into an
//! integrity-checked container file; [`restore`] validates such a file
//! and writes only the half-pages that differ from what the device
//! currently holds, then restarts it.
//!
//! Neither the protocol nor the memory layout is documented by the
//! vendor. Use at your own risk.

pub mod backup;
pub mod confirm;
pub mod container;
pub mod device;
pub mod restore;
pub mod serial;

pub use backup::{BackupOptions, BackupReport};
pub use confirm::{Assume, Confirm, StdinConfirm};
pub use container::{ContainerReader, ContainerWriter, Header};
pub use device::{DeviceSession, MemoryRegion};
pub use restore::{RestoreOptions, RestoreReport};
pub use serial::{SerialLink, Transport};
