use {
    clap::Parser,
    consts::{DEFAULT_PIO_ENV, FILESYSTEM_BIN, FIRMWARE_BIN, PACKAGE_FILE},
    std::path::{Path, PathBuf},
};

mod cli;
mod config;

pub use config::Error as ConfigError;

/// Program arguments loaded from the CLI and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    /// Dump the package header to stdout.
    Dump { input: PathBuf },
    /// Pack a firmware and a filesystem image.
    Pack {
        firmware: PathBuf,
        filesystem: PathBuf,
        output: PathBuf,
    },
}

pub const PACK_USAGE: &str = "gfpkg pack [<FIRMWARE> <FILESYSTEM> <OUTPUT>]";

pub fn args<I, T>(args: I) -> Result<Args, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Args::try_parse_from(args).map_err(Error::Cli)?;
    match cli.command {
        cli::Command::Dump { input } => Ok(Args::Dump { input }),
        cli::Command::Pack { paths, env, config } => match <[PathBuf; 3]>::try_from(paths) {
            Ok([firmware, filesystem, output]) => {
                // Explicit paths leave nothing for the environment or config to decide.
                if env.is_some() {
                    return Err(Error::EnvWithExplicitPaths);
                }
                if config.is_some() {
                    return Err(Error::ConfigWithExplicitPaths);
                }
                Ok(Args::Pack {
                    firmware,
                    filesystem,
                    output,
                })
            }
            Err(paths) if paths.is_empty() => {
                let config = config.map(|c| config::Config::load(&c)).transpose()?;
                let config_env = config.as_ref().and_then(|config| config.env.clone());
                let config_build_dir = config.and_then(|config| config.build_dir);

                // Reconcile the CLI and config arguments. Error if anything is specified both
                // on the CLI and in the config file.
                let env = match (env, config_env) {
                    (None, None) => DEFAULT_PIO_ENV.to_owned(),
                    (None, Some(env)) => env,
                    (Some(env), None) => env,
                    (Some(_), Some(_)) => return Err(Error::EnvInConfigAndCli),
                };
                let build_dir = config_build_dir.unwrap_or_else(|| default_build_dir(&env));

                Ok(Args::Pack {
                    firmware: build_dir.join(FIRMWARE_BIN),
                    filesystem: build_dir.join(FILESYSTEM_BIN),
                    output: build_dir.join(PACKAGE_FILE),
                })
            }
            Err(paths) => Err(Error::Usage(paths.len())),
        },
    }
}

/// PlatformIO build directory of an environment, relative to the project.
pub fn default_build_dir(env: &str) -> PathBuf {
    Path::new(".pio").join("build").join(env)
}

#[derive(Debug)]
pub enum Error {
    Cli(clap::Error),
    Config(ConfigError),
    ConfigWithExplicitPaths,
    EnvInConfigAndCli,
    EnvWithExplicitPaths,
    Usage(usize),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Cli(e) => write!(f, "{}", e.render().ansi()),
            Error::Config(e) => write!(f, "config error: {e}"),
            Error::ConfigWithExplicitPaths => {
                write!(f, "cannot specify --config (-c) together with explicit paths")
            }
            Error::EnvInConfigAndCli => write!(f, "env specified in both config and cli"),
            Error::EnvWithExplicitPaths => {
                write!(f, "cannot specify --env together with explicit paths")
            }
            Error::Usage(count) => write!(
                f,
                "expected either no paths or exactly three, got {count}\n\nUsage: {PACK_USAGE}"
            ),
        }
    }
}

impl std::error::Error for Error {}
