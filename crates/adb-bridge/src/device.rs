//! Device Types and State
//!
//! Attached Android devices, physical and emulated.

/// Device state as reported by `adb devices`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Device is online and ready
    Online,
    /// Device is offline
    Offline,
    /// Device is not authorized (needs acceptance on the device)
    Unauthorized,
    /// Unknown state
    Unknown,
}

impl DeviceState {
    pub fn is_usable(&self) -> bool {
        matches!(self, DeviceState::Online)
    }
}

/// Device kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Physical device connected via USB/WiFi
    Physical,
    /// Android emulator
    Emulator,
}

/// One attached device
#[derive(Debug, Clone)]
pub struct Device {
    /// Serial number, the `-s` argument for every adb call
    pub serial: String,
    /// Reported state
    pub state: DeviceState,
    /// Physical or emulated
    pub kind: DeviceKind,
    /// Model name (e.g. "Nexus_5")
    pub model: Option<String>,
    /// Product name
    pub product: Option<String>,
}

impl Device {
    /// Whether the device can accept installs and shell commands.
    pub fn is_usable(&self) -> bool {
        self.state.is_usable()
    }

    pub fn is_emulator(&self) -> bool {
        self.kind == DeviceKind::Emulator
    }

    /// Model with underscores flattened, falling back to the serial.
    pub fn short_name(&self) -> String {
        self.model
            .as_ref()
            .map(|m| m.replace('_', " "))
            .unwrap_or_else(|| self.serial.clone())
    }
}
