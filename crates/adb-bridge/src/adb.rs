//! ADB (Android Debug Bridge) Client
//!
//! Thin wrapper over the SDK's adb binary. Device enumeration parses the
//! `adb devices -l` listing; everything else is argument plumbing.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::device::{Device, DeviceKind, DeviceState};

/// ADB errors
#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    #[error("adb not found under {}", .0.display())]
    NotFound(PathBuf),
    #[error("adb command failed: {0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// ADB Client
pub struct AdbClient {
    sdk_dir: PathBuf,
}

impl AdbClient {
    /// Create a client for the SDK at `sdk_dir`.
    pub fn new(sdk_dir: PathBuf) -> Self {
        Self { sdk_dir }
    }

    /// Get the adb executable path
    pub fn adb_path(&self) -> PathBuf {
        let platform_tools = self.sdk_dir.join("platform-tools");
        if cfg!(windows) {
            platform_tools.join("adb.exe")
        } else {
            platform_tools.join("adb")
        }
    }

    /// Check if adb is available
    pub fn is_available(&self) -> bool {
        self.adb_path().exists()
    }

    /// Run an adb command
    async fn run(&self, args: &[&str]) -> Result<String, AdbError> {
        let adb = self.adb_path();

        if !adb.exists() {
            return Err(AdbError::NotFound(adb));
        }

        debug!("adb {:?}", args);

        let output = Command::new(&adb).args(args).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdbError::CommandFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run an adb command against a specific device
    async fn run_for_device(&self, serial: &str, args: &[&str]) -> Result<String, AdbError> {
        let mut full_args = vec!["-s", serial];
        full_args.extend(args);
        self.run(&full_args).await
    }

    /// List attached devices
    pub async fn list_devices(&self) -> Result<Vec<Device>, AdbError> {
        let output = self.run(&["devices", "-l"]).await?;
        Ok(parse_devices(&output))
    }

    /// Human-readable labels for device selection, one per usable device,
    /// in the same order as [`list_devices`](Self::list_devices).
    pub async fn device_options(&self, devices: &[Device]) -> Vec<String> {
        let mut options = Vec::with_capacity(devices.len());
        for device in devices {
            let version = match self.get_prop(&device.serial, "ro.build.version.release").await {
                Ok(version) if !version.is_empty() => version,
                _ => {
                    warn!("could not read android version for {}", device.serial);
                    "x.x.x".to_string()
                }
            };
            options.push(format!("{} {} - {}", device.short_name(), version, device.serial));
        }
        options
    }

    /// Run a shell command on a device
    pub async fn shell(&self, serial: &str, command: &str) -> Result<String, AdbError> {
        self.run_for_device(serial, &["shell", command]).await
    }

    /// Install an APK, replacing any existing install
    pub async fn install(&self, serial: &str, apk_path: &Path) -> Result<(), AdbError> {
        let path_str = apk_path.to_string_lossy();
        self.run_for_device(serial, &["install", "-r", &path_str])
            .await?;
        Ok(())
    }

    /// Launch an activity by component name
    pub async fn start_activity(&self, serial: &str, component: &str) -> Result<(), AdbError> {
        self.shell(serial, &format!("am start -n {}", component))
            .await?;
        Ok(())
    }

    /// Get a device property
    pub async fn get_prop(&self, serial: &str, prop: &str) -> Result<String, AdbError> {
        let output = self.shell(serial, &format!("getprop {}", prop)).await?;
        Ok(output.trim().to_string())
    }
}

/// Parse the output of `adb devices -l`.
pub fn parse_devices(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in output.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let serial = parts[0].to_string();
        let state = match parts[1] {
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            _ => DeviceState::Unknown,
        };

        let mut model = None;
        let mut product = None;
        for part in parts.iter().skip(2) {
            if let Some(value) = part.strip_prefix("model:") {
                model = Some(value.to_string());
            } else if let Some(value) = part.strip_prefix("product:") {
                product = Some(value.to_string());
            }
        }

        let kind = if serial.starts_with("emulator-") {
            DeviceKind::Emulator
        } else {
            DeviceKind::Physical
        };

        devices.push(Device {
            serial,
            state,
            kind,
            model,
            product,
        });
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LISTING: &str = "List of devices attached\n\
        emulator-5554          device product:sdk_phone_x86 model:Android_SDK_built_for_x86 device:generic_x86 transport_id:1\n\
        0a388e93               unauthorized usb:1-1 transport_id:2\n\
        \n";

    #[test]
    fn test_parse_devices_listing() {
        let devices = parse_devices(SAMPLE_LISTING);
        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].state, DeviceState::Online);
        assert_eq!(devices[0].kind, DeviceKind::Emulator);
        assert_eq!(devices[0].model.as_deref(), Some("Android_SDK_built_for_x86"));
        assert_eq!(devices[0].product.as_deref(), Some("sdk_phone_x86"));
        assert_eq!(devices[0].short_name(), "Android SDK built for x86");
        assert!(devices[0].is_usable());

        assert_eq!(devices[1].serial, "0a388e93");
        assert_eq!(devices[1].state, DeviceState::Unauthorized);
        assert_eq!(devices[1].kind, DeviceKind::Physical);
        assert_eq!(devices[1].short_name(), "0a388e93");
        assert!(!devices[1].is_usable());
    }

    #[test]
    fn test_parse_devices_empty_listing() {
        assert!(parse_devices("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_adb_path_under_platform_tools() {
        let client = AdbClient::new(PathBuf::from("/opt/android-sdk"));
        let path = client.adb_path();
        assert!(path.starts_with("/opt/android-sdk/platform-tools"));
        assert!(!client.is_available());
    }
}
