//! Ant Runner
//!
//! Composes the shell pipeline for one build request: the ant invocation,
//! optionally chained with `adb install` and an `am start` launch, each
//! stage gated on the previous one succeeding.

use std::path::PathBuf;

use droidant_project::manifest;

use crate::coordinator::{BuildRequest, DoneCallback};
use crate::{BuildDescriptor, BuildError};

/// Options for one build invocation.
///
/// Contract: `device` must be set whenever `install` or `run` is requested;
/// violating this is a caller bug and fails before any process is spawned.
pub struct AntBuildOptions {
    /// ANT target to build.
    pub target: String,
    /// Device serial for the install/launch stages.
    pub device: Option<String>,
    /// Install the built artifact after a successful build.
    pub install: bool,
    /// Launch the main activity after a successful install.
    pub run: bool,
    /// Echo build output as it streams in.
    pub verbose: bool,
    /// Extra arguments inserted before the target.
    pub ant_args: Vec<String>,
    /// Invoked once after the process exits and cleanup is done.
    pub on_done: Option<DoneCallback>,
}

impl AntBuildOptions {
    /// Options for a plain build of `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            device: None,
            install: false,
            run: false,
            verbose: false,
            ant_args: Vec::new(),
            on_done: None,
        }
    }

    /// Set the device serial for install/launch.
    pub fn with_device(mut self, serial: impl Into<String>) -> Self {
        self.device = Some(serial.into());
        self
    }

    /// Chain an install after a successful build.
    pub fn with_install(mut self, install: bool) -> Self {
        self.install = install;
        self
    }

    /// Chain an activity launch after a successful install.
    pub fn with_run(mut self, run: bool) -> Self {
        self.run = run;
        self
    }

    /// Echo build output while it streams.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Extra ant arguments.
    pub fn with_ant_args(mut self, args: Vec<String>) -> Self {
        self.ant_args = args;
        self
    }

    /// Completion callback, invoked with the build's disposition.
    pub fn with_callback(mut self, on_done: DoneCallback) -> Self {
        self.on_done = Some(on_done);
        self
    }
}

/// Composes build commands for one project.
pub struct AntRunner {
    project_dir: PathBuf,
    sdk_dir: PathBuf,
    default_activity: Option<String>,
}

impl AntRunner {
    /// Create a runner for the project at `project_dir` using the SDK at
    /// `sdk_dir`.
    pub fn new(project_dir: PathBuf, sdk_dir: PathBuf) -> Self {
        Self {
            project_dir,
            sdk_dir,
            default_activity: None,
        }
    }

    /// Override the launch activity instead of reading the manifest.
    pub fn with_default_activity(mut self, activity: impl Into<String>) -> Self {
        self.default_activity = Some(activity.into());
        self
    }

    /// Get the adb executable path.
    fn adb_path(&self) -> PathBuf {
        let platform_tools = self.sdk_dir.join("platform-tools");
        if cfg!(windows) {
            platform_tools.join("adb.exe")
        } else {
            platform_tools.join("adb")
        }
    }

    /// Compose the full shell pipeline for `options`.
    ///
    /// The install path and launch activity are resolved only when the
    /// corresponding stage is requested.
    pub async fn compose_command(&self, options: &AntBuildOptions) -> Result<String, BuildError> {
        assert!(
            !(options.install && options.device.is_none()),
            "install requested without a device"
        );
        assert!(
            !(options.run && options.device.is_none()),
            "run requested without a device"
        );

        let mut cmd = format!("cd {} && ant", self.project_dir.display());
        for arg in &options.ant_args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        cmd.push(' ');
        cmd.push_str(&options.target);

        let adb = self.adb_path();

        if options.install {
            let device = options.device.as_deref().unwrap_or_default();
            let apk = self.artifact_path(&options.target).await?;
            cmd.push_str(&format!(
                " && echo && echo Installing Package && {} -s {} install -r {}",
                adb.display(),
                device,
                apk.display()
            ));
        }

        if options.run {
            let device = options.device.as_deref().unwrap_or_default();
            let activity = self.launch_activity().await?;
            cmd.push_str(&format!(
                " && {} -s {} shell am start -n {}",
                adb.display(),
                device,
                activity
            ));
        }

        Ok(cmd)
    }

    /// Turn `options` into a request ready for the coordinator.
    pub async fn request(&self, options: AntBuildOptions) -> Result<BuildRequest, BuildError> {
        let command = self.compose_command(&options).await?;
        let AntBuildOptions {
            target,
            verbose,
            on_done,
            ..
        } = options;

        let mut request = BuildRequest::new(target, command).with_verbose(verbose);
        if let Some(on_done) = on_done {
            request = request.with_callback(on_done);
        }
        Ok(request)
    }

    /// Built artifact for `target`: `bin/<ant project name>-<target>.apk`.
    async fn artifact_path(&self, target: &str) -> Result<PathBuf, BuildError> {
        let build_xml = self.project_dir.join("build.xml");
        let name = BuildDescriptor::project_name(&build_xml)
            .await?
            .ok_or(BuildError::MissingProjectName)?;
        Ok(self
            .project_dir
            .join("bin")
            .join(format!("{}-{}.apk", name, target)))
    }

    /// Component identifier for the launch stage: the configured override,
    /// or the manifest's MAIN activity.
    async fn launch_activity(&self) -> Result<String, BuildError> {
        if let Some(activity) = &self.default_activity {
            if !activity.is_empty() {
                return Ok(activity.clone());
            }
        }
        let manifest_path = self.project_dir.join("AndroidManifest.xml");
        Ok(manifest::main_activity(&manifest_path).await?)
    }
}
