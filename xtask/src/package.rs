// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::steps::{BuildStep, StepRunner};
use crate::Error;
use consts::{FILESYSTEM_BIN, FIRMWARE_BIN, PACKAGE_FILE};
use std::path::{Path, PathBuf};

/// Where the PlatformIO project lives and which environment is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub project_dir: PathBuf,
    pub pio_env: String,
    pub build_dir: PathBuf,
}

impl BuildContext {
    /// Context with the build directory PlatformIO uses for `pio_env`.
    pub fn new(project_dir: impl Into<PathBuf>, pio_env: impl Into<String>) -> Self {
        let project_dir = project_dir.into();
        let pio_env = pio_env.into();
        let build_dir = project_dir.join(".pio").join("build").join(&pio_env);
        Self {
            project_dir,
            pio_env,
            build_dir,
        }
    }

    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    pub fn firmware_bin(&self) -> PathBuf {
        self.build_dir.join(FIRMWARE_BIN)
    }

    pub fn filesystem_bin(&self) -> PathBuf {
        self.build_dir.join(FILESYSTEM_BIN)
    }

    pub fn package_file(&self) -> PathBuf {
        self.build_dir.join(PACKAGE_FILE)
    }

    /// The web client sits next to the embedded project.
    pub fn web_dir(&self) -> PathBuf {
        self.project_dir.join("..").join("web")
    }
}

fn npm() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

pub fn firmware_step(ctx: &BuildContext) -> BuildStep {
    BuildStep::new("pio", &["run", "-e", ctx.pio_env.as_str()], &ctx.project_dir)
}

pub fn web_app_step(ctx: &BuildContext) -> BuildStep {
    BuildStep::new(npm(), &["run", "build"], ctx.web_dir())
}

pub fn filesystem_step(ctx: &BuildContext) -> BuildStep {
    BuildStep::new("pio", &["run", "-t", "buildfs", "-e", ctx.pio_env.as_str()], &ctx.project_dir)
}

/// Build the firmware and the web app, build the filesystem image from the
/// web app, then pack firmware and filesystem into the update package.
///
/// Each step only runs if the previous one succeeded.
pub fn package(ctx: &BuildContext, runner: &mut impl StepRunner) -> Result<gfpkg::PackSummary, Error> {
    tracing::info!("Building firmware for {}...", ctx.pio_env);
    run_step(runner, &firmware_step(ctx), Error::FirmwareBuildFailed)?;

    tracing::info!("Building web app...");
    run_step(runner, &web_app_step(ctx), Error::WebAppBuildFailed)?;

    tracing::info!("Building filesystem image...");
    run_step(runner, &filesystem_step(ctx), Error::FilesystemBuildFailed)?;

    tracing::info!("Packing {} and {}", FIRMWARE_BIN, FILESYSTEM_BIN);
    let summary = gfpkg::pack_files(ctx.firmware_bin(), ctx.filesystem_bin(), ctx.package_file())?;
    Ok(summary)
}

fn run_step(
    runner: &mut impl StepRunner,
    step: &BuildStep,
    failed: fn(crate::steps::StepStatus) -> Error,
) -> Result<(), Error> {
    tracing::debug!("Running {step}");
    let status = runner.run(step).map_err(|e| Error::RunStep(step.program.clone(), e))?;
    if !status.success() {
        tracing::error!("{step} failed with {status}");
        return Err(failed(status));
    }
    Ok(())
}

/// Resolve the project directory, accepting relative paths.
pub fn project_dir(dir: Option<&Path>) -> std::io::Result<PathBuf> {
    match dir {
        Some(dir) if dir.is_absolute() => Ok(dir.to_owned()),
        Some(dir) => Ok(std::env::current_dir()?.join(dir)),
        None => std::env::current_dir(),
    }
}
