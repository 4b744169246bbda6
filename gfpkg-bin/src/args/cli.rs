//! Command line arguments.

use std::path::PathBuf;

#[derive(clap::Parser)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Dump the package header to stdout.
    Dump {
        /// The package file.
        #[clap(short, long)]
        input: PathBuf,
    },
    /// Pack a firmware and a filesystem image into a single update package.
    ///
    /// Without paths, the images are taken from the PlatformIO build
    /// directory of the configured environment.
    Pack {
        /// Firmware binary, filesystem image and output package, in that
        /// order.
        #[clap(value_name = "FIRMWARE FILESYSTEM OUTPUT")]
        paths: Vec<PathBuf>,
        /// PlatformIO environment whose build directory holds the images.
        #[clap(long)]
        env: Option<String>,
        /// Path to config file.
        #[clap(long, short)]
        config: Option<PathBuf>,
    },
}
