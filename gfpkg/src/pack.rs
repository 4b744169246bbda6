//! Packing firmware and filesystem images from disk.

use {
    crate::Header,
    std::{
        fmt,
        fs,
        io::Write,
        path::{Path, PathBuf},
    },
};

/// Create a combined update package at `output` from the two images.
///
/// Both inputs are checked and read before `output` is touched, so a missing
/// image never truncates an existing package. The output is overwritten
/// unconditionally.
pub fn pack_files(
    firmware: impl AsRef<Path>,
    filesystem: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<PackSummary, PackError> {
    let (firmware, filesystem, output) = (firmware.as_ref(), filesystem.as_ref(), output.as_ref());

    if !firmware.is_file() {
        return Err(PackError::FirmwareNotFound(firmware.to_path_buf()));
    }
    if !filesystem.is_file() {
        return Err(PackError::FilesystemNotFound(filesystem.to_path_buf()));
    }

    let firmware_data = fs::read(firmware).map_err(PackError::ReadFirmware)?;
    let filesystem_data = fs::read(filesystem).map_err(PackError::ReadFilesystem)?;
    let header = Header::new(&firmware_data, &filesystem_data)?;

    let mut file = fs::File::create(output).map_err(PackError::CreateOutputFile)?;
    file.write_all(&header.to_bytes())
        .and_then(|()| file.write_all(&firmware_data))
        .and_then(|()| file.write_all(&filesystem_data))
        .and_then(|()| file.flush())
        .map_err(PackError::WriteOutputFile)?;

    Ok(PackSummary {
        output: output.to_path_buf(),
        firmware_size: header.firmware_size(),
        filesystem_size: header.filesystem_size(),
    })
}

/// What was written by [`pack_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub output: PathBuf,
    pub firmware_size: u32,
    pub filesystem_size: u32,
}

impl PackSummary {
    pub fn total_size(&self) -> u64 {
        Header::SIZE as u64 + u64::from(self.firmware_size) + u64::from(self.filesystem_size)
    }
}

impl fmt::Display for PackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created {}", self.output.display())?;
        size_line(f, "Firmware", self.firmware_size.into())?;
        size_line(f, "Filesystem", self.filesystem_size.into())?;
        size_line(f, "Total", self.total_size())
    }
}

fn size_line(f: &mut fmt::Formatter<'_>, name: &str, size: u64) -> fmt::Result {
    writeln!(
        f,
        "   {name:10} {size:>12} bytes ({})",
        humansize::format_size(size, humansize::BINARY),
    )
}

#[derive(Debug)]
pub enum PackError {
    CreateOutputFile(std::io::Error),
    FilesystemNotFound(PathBuf),
    FirmwareNotFound(PathBuf),
    Header(crate::Error),
    ReadFilesystem(std::io::Error),
    ReadFirmware(std::io::Error),
    WriteOutputFile(std::io::Error),
}

impl From<crate::Error> for PackError {
    fn from(e: crate::Error) -> Self {
        PackError::Header(e)
    }
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateOutputFile(e) => write!(f, "failed to create output file: {e}"),
            Self::FilesystemNotFound(path) => write!(
                f,
                "filesystem image not found: {}; build it first with `pio run -t buildfs`",
                path.display()
            ),
            Self::FirmwareNotFound(path) => {
                write!(f, "firmware binary not found: {}", path.display())
            }
            Self::Header(e) => write!(f, "{e}"),
            Self::ReadFilesystem(e) => write!(f, "failed to read filesystem image: {e}"),
            Self::ReadFirmware(e) => write!(f, "failed to read firmware binary: {e}"),
            Self::WriteOutputFile(e) => write!(f, "failed to write to output file: {e}"),
        }
    }
}

impl std::error::Error for PackError {}
