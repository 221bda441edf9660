//! CLI commands for Droidant
//!
//! Each command is a small struct executed against a shared
//! [`CommandContext`], mirroring how an editor plugin would wire its
//! palette entries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use droidant_adb_bridge::AdbClient;
use droidant_build_engine::{
    resolve_targets, AntBuildOptions, AntRunner, BuildCoordinator, BuildResult,
};
use droidant_core::{EventBus, Settings};
use droidant_project::{find_project_root, properties};

/// Label of the synthetic first entry in the target list.
pub const BUILD_INSTALL_RUN: &str = "Build, Install, Run";

/// Shared state for command execution.
pub struct CommandContext {
    pub settings: Settings,
    pub project_dir: PathBuf,
    pub sdk_dir: PathBuf,
    pub events: Arc<EventBus>,
    pub coordinator: Arc<BuildCoordinator>,
}

impl CommandContext {
    /// Resolve the project and SDK directories starting from `start`.
    ///
    /// Settings overrides win; otherwise the project root is found by
    /// walking up from `start` and the SDK directory is read from the
    /// project's local.properties.
    pub async fn discover(settings: Settings, start: &Path) -> Result<Self> {
        let project_dir = match &settings.project_path {
            Some(path) => path.clone(),
            None => find_project_root(start)
                .context("no Android project found (missing AndroidManifest.xml or project.properties)")?,
        };

        let sdk_dir = match &settings.sdk_dir {
            Some(path) => path.clone(),
            None => properties::sdk_dir(&project_dir)
                .await
                .context("could not determine the Android SDK directory")?,
        };

        info!("project: {:?}, sdk: {:?}", project_dir, sdk_dir);

        let events = Arc::new(EventBus::new());
        let coordinator = BuildCoordinator::new(events.clone());

        Ok(Self {
            settings,
            project_dir,
            sdk_dir,
            events,
            coordinator,
        })
    }

    /// Runner for the context's project.
    pub fn runner(&self) -> AntRunner {
        let mut runner = AntRunner::new(self.project_dir.clone(), self.sdk_dir.clone());
        if let Some(activity) = &self.settings.default_activity {
            runner = runner.with_default_activity(activity.clone());
        }
        runner
    }

    /// ADB client for the context's SDK.
    pub fn adb(&self) -> AdbClient {
        AdbClient::new(self.sdk_dir.clone())
    }
}

/// Discovered targets, ready for display and selection.
pub struct TargetList {
    entries: Vec<(String, String)>,
    default_target: String,
}

impl TargetList {
    /// Target names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Display lines: the combined build/install/run entry first, then
    /// one line per target.
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(self.entries.len() + 1);
        options.push(BUILD_INSTALL_RUN.to_string());
        for (name, description) in &self.entries {
            options.push(format!("{} - {}", title_case(name), description));
        }
        options
    }

    /// Resolve a selection index from [`options`](Self::options) into a
    /// concrete choice.
    pub fn pick(&self, index: usize) -> Option<TargetChoice> {
        if index == 0 {
            return Some(TargetChoice {
                target: self.default_target.clone(),
                install_and_run: true,
            });
        }
        self.entries.get(index - 1).map(|(name, _)| TargetChoice {
            target: name.clone(),
            install_and_run: false,
        })
    }
}

/// One selection from the target list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChoice {
    pub target: String,
    pub install_and_run: bool,
}

/// List the invokable targets of the current project.
pub struct ListTargetsCommand;

impl ListTargetsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<TargetList> {
        let build_xml = ctx.project_dir.join("build.xml");
        let targets = resolve_targets(&build_xml, &ctx.sdk_dir, &ctx.project_dir).await?;

        let mut entries: Vec<(String, String)> = targets.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(TargetList {
            entries,
            default_target: ctx.settings.default_target.clone(),
        })
    }
}

/// Build one target, without installing.
pub struct BuildCommand {
    /// Target to build; defaults to the configured default target.
    pub target: Option<String>,
}

impl BuildCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<BuildResult> {
        let target = self
            .target
            .clone()
            .unwrap_or_else(|| ctx.settings.default_target.clone());

        info!("building target {}", target);
        let (tx, rx) = tokio::sync::oneshot::channel();
        let options = AntBuildOptions::new(target)
            .with_verbose(true)
            .with_ant_args(ctx.settings.ant_args.clone())
            .with_callback(Box::new(move |result| {
                let _ = tx.send(result);
            }));

        let request = ctx.runner().request(options).await?;
        ctx.coordinator.submit(request);

        let result = rx.await.context("build dropped without completing")?;
        Ok(result)
    }
}

/// Build the default target, then install and launch it on a device.
pub struct RunCommand {
    /// Device serial; auto-selected when exactly one device is attached.
    pub device: Option<String>,
}

impl RunCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<BuildResult> {
        let adb = ctx.adb();
        let serial = match &self.device {
            Some(serial) => serial.clone(),
            None => {
                let devices = adb.list_devices().await?;
                let usable: Vec<_> = devices.into_iter().filter(|d| d.is_usable()).collect();
                match usable.len() {
                    0 => bail!("no device attached"),
                    1 if ctx.settings.device_select_default => usable[0].serial.clone(),
                    _ => {
                        let options = adb.device_options(&usable).await;
                        bail!(
                            "multiple devices attached, pass one explicitly:\n  {}",
                            options.join("\n  ")
                        );
                    }
                }
            }
        };

        info!("building, installing, and running on {}", serial);
        let (tx, rx) = tokio::sync::oneshot::channel();
        let options = AntBuildOptions::new(ctx.settings.default_target.clone())
            .with_device(serial)
            .with_install(true)
            .with_run(true)
            .with_verbose(true)
            .with_ant_args(ctx.settings.ant_args.clone())
            .with_callback(Box::new(move |result| {
                let _ = tx.send(result);
            }));

        let request = ctx.runner().request(options).await?;
        ctx.coordinator.submit(request);

        let result = rx.await.context("build dropped without completing")?;
        Ok(result)
    }
}

/// List attached devices.
pub struct DevicesCommand;

impl DevicesCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let adb = ctx.adb();
        if !adb.is_available() {
            bail!("adb not found under {:?}", ctx.sdk_dir);
        }

        let devices = adb.list_devices().await?;
        if devices.is_empty() {
            println!("No devices attached");
            return Ok(());
        }

        let options = adb.device_options(&devices).await;
        println!("Attached devices:");
        for option in options {
            println!("  {}", option);
        }
        Ok(())
    }
}

/// Cancel the active build.
pub struct KillCommand;

impl KillCommand {
    pub fn execute(&self, ctx: &CommandContext) {
        ctx.coordinator.kill();
    }
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
