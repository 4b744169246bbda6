use {
    colored::Colorize,
    std::{ffi::OsString, io::Write},
};

mod args;

#[cfg(test)]
mod tests;

fn main() -> std::process::ExitCode {
    main_args(
        std::env::args_os(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .into()
}

fn main_args<I, T>(args: I, stdout: impl Write, mut stderr: impl Write) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match run(args, stdout) {
        Ok(()) => ExitCode(0),
        Err(Error::Args(args::Error::Cli(e))) => {
            // Clap already does the "error: {}" formatting.
            writeln!(stderr, "{}", e.render().ansi()).expect("write error to stderr");
            ExitCode(if e.use_stderr() { 1 } else { 0 })
        }
        Err(e) => {
            writeln!(stderr, "{} {e}", "error:".bold().red()).expect("write error to stderr");
            ExitCode(1)
        }
    }
}

fn run<I, T>(args: I, mut stdout: impl Write) -> Result<(), Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match args::args(args)? {
        args::Args::Dump { input } => {
            let input_buf = std::fs::read(input).map_err(Error::ReadInputFile)?;
            match gfpkg::Header::parse(&input_buf)? {
                Some(package) => {
                    let header = package.header();
                    writeln!(
                        &mut stdout,
                        "{:10} {} ({})",
                        "magic".bold(),
                        String::from_utf8_lossy(&header.magic()),
                        hex::encode(header.magic()),
                    )
                    .map_err(Error::Stdout)?;
                    writeln!(
                        &mut stdout,
                        "{:10} {}",
                        "version".bold(),
                        header.format_version()
                    )
                    .map_err(Error::Stdout)?;
                    for (name, size) in [
                        ("firmware", u64::from(header.firmware_size())),
                        ("filesystem", u64::from(header.filesystem_size())),
                        ("total", header.package_size()),
                    ] {
                        let human_size = humansize::format_size(size, humansize::BINARY);
                        writeln!(&mut stdout, "{:10} {human_size} ({size})", name.bold())
                            .map_err(Error::Stdout)?;
                    }
                }
                None => writeln!(&mut stdout, "{}", "no package header found".bold())
                    .map_err(Error::Stdout)?,
            }
        }
        args::Args::Pack {
            firmware,
            filesystem,
            output,
        } => {
            let summary = gfpkg::pack_files(&firmware, &filesystem, &output)?;
            write!(&mut stdout, "{summary}").map_err(Error::Stdout)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExitCode(u8);

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        code.0.into()
    }
}

#[derive(Debug)]
enum Error {
    Args(args::Error),
    Gfpkg(gfpkg::Error),
    Pack(gfpkg::PackError),
    ReadInputFile(std::io::Error),
    Stdout(std::io::Error),
}

impl From<args::Error> for Error {
    fn from(e: args::Error) -> Self {
        Error::Args(e)
    }
}

impl From<gfpkg::Error> for Error {
    fn from(e: gfpkg::Error) -> Self {
        Error::Gfpkg(e)
    }
}

impl From<gfpkg::PackError> for Error {
    fn from(e: gfpkg::PackError) -> Self {
        Error::Pack(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Args(e) => write!(f, "{e}"),
            Error::Gfpkg(e) => write!(f, "{e}"),
            Error::Pack(e) => write!(f, "{e}"),
            Error::ReadInputFile(e) => write!(f, "failed to read input file: {e}"),
            Error::Stdout(e) => write!(f, "failed to write to stdout: {e}"),
        }
    }
}

impl std::error::Error for Error {}
