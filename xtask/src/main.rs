// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::{Parser, Subcommand};
use consts::DEFAULT_PIO_ENV;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::{fmt, fs, io};
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

mod hal;
mod package;
mod steps;


#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct XtaskArgs {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Package GFPKG: pack firmware + filesystem into a single .gfpkg update file
    ///
    /// Builds the firmware and the web app, then the LittleFS image, then packs
    /// firmware.bin and littlefs.bin into system.gfpkg.
    /// Always runs every step.
    #[command(verbatim_doc_comment)]
    Package {
        /// PlatformIO project directory [default: current directory]
        #[arg(long, env = "PROJECT_DIR")]
        project_dir: Option<PathBuf>,
        /// PlatformIO environment to build the filesystem image for
        #[arg(long, env = "PIOENV", default_value = DEFAULT_PIO_ENV)]
        pio_env: String,
        /// Build output directory [default: <PROJECT_DIR>/.pio/build/<PIOENV>]
        #[arg(long, env = "BUILD_DIR")]
        build_dir: Option<PathBuf>,
    },

    /// Select the HAL sources and defines for a PlatformIO platform
    ///
    /// Writes a PlatformIO config fragment with build_flags and
    /// build_src_filter. Unknown platforms write nothing.
    #[command(verbatim_doc_comment)]
    SelectHal {
        /// PlatformIO platform identifier, e.g. espressif32
        #[arg(long, env = "PIOPLATFORM")]
        platform: Option<String>,
        /// Write the fragment here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn run(args: XtaskArgs) -> Result<(), Error> {
    match args.command {
        Commands::Package {
            project_dir,
            pio_env,
            build_dir,
        } => {
            let project_dir = package::project_dir(project_dir.as_deref()).map_err(Error::ProjectDir)?;
            let mut ctx = package::BuildContext::new(project_dir, pio_env);
            if let Some(build_dir) = build_dir {
                ctx = ctx.with_build_dir(build_dir);
            }
            let mut runner = steps::ProcessRunner { verbose: args.verbose };
            let summary = package::package(&ctx, &mut runner)?;
            print!("{summary}");
        }
        Commands::SelectHal { platform, output } => {
            select_hal(platform, output, &mut io::stdout())?;
        }
    }
    Ok(())
}

/// Apply the HAL selection for `platform` and emit it as a config fragment.
fn select_hal(
    platform: Option<String>,
    output: Option<PathBuf>,
    stdout: &mut impl Write,
) -> Result<(), Error> {
    let mut config = hal::PioConfig::new(platform);
    if hal_select::apply(&mut config).is_none() {
        return Ok(());
    }
    match output {
        Some(path) => fs::write(&path, config.to_string()).map_err(Error::WriteHalConfig)?,
        None => write!(stdout, "{config}").map_err(Error::Stdout)?,
    }
    Ok(())
}

#[derive(Debug)]
pub enum Error {
    FilesystemBuildFailed(steps::StepStatus),
    FirmwareBuildFailed(steps::StepStatus),
    Pack(gfpkg::PackError),
    ProjectDir(io::Error),
    RunStep(String, io::Error),
    Stdout(io::Error),
    WebAppBuildFailed(steps::StepStatus),
    WriteHalConfig(io::Error),
}

impl From<gfpkg::PackError> for Error {
    fn from(e: gfpkg::PackError) -> Self {
        Error::Pack(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FilesystemBuildFailed(status) => {
                write!(f, "filesystem image build failed ({status})")
            }
            Error::FirmwareBuildFailed(status) => write!(f, "firmware build failed ({status})"),
            Error::Pack(e) => write!(f, "{e}"),
            Error::ProjectDir(e) => write!(f, "failed to resolve project directory: {e}"),
            Error::RunStep(program, e) => write!(f, "failed to run {program}: {e}"),
            Error::Stdout(e) => write!(f, "failed to write to stdout: {e}"),
            Error::WebAppBuildFailed(status) => write!(f, "web app build failed ({status})"),
            Error::WriteHalConfig(e) => write!(f, "failed to write HAL config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

fn main() -> ExitCode {
    // Tracing using RUST_LOG, info by default. Logs go to stderr so that
    // generated config on stdout stays clean.
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = XtaskArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
