//! ADB Bridge
//!
//! Enumerates attached Android devices and drives install/launch
//! operations through the SDK's adb binary.

pub mod adb;
pub mod device;

pub use adb::{AdbClient, AdbError};
pub use device::{Device, DeviceKind, DeviceState};
