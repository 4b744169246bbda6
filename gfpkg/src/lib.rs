#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

use consts::{PACKAGE_FORMAT_VERSION, PACKAGE_HEADER_SIZE, PACKAGE_MAGIC, PACKAGE_RESERVED_SIZE};

#[cfg(feature = "std")]
mod pack;

#[cfg(feature = "std")]
pub use pack::{pack_files, PackError, PackSummary};


/// Combined update package header.
///
/// The header is followed by the firmware image and then the filesystem
/// image, with nothing in between and nothing after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    magic: [u8; 4],
    format_version: u8,
    firmware_size: [u8; 4],
    filesystem_size: [u8; 4],
}

impl Header {
    /// Size of the header in bytes.
    pub const SIZE: usize = PACKAGE_HEADER_SIZE;

    /// Number of reserved bytes at the end of the header.
    pub const RESERVED: usize = PACKAGE_RESERVED_SIZE;

    /// Create the header for the given payloads.
    ///
    /// Sizes are always taken from the payloads themselves so the header can
    /// never disagree with what follows it.
    pub fn new(firmware: &[u8], filesystem: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            magic: PACKAGE_MAGIC,
            format_version: PACKAGE_FORMAT_VERSION,
            firmware_size: u32::try_from(firmware.len())
                .map_err(|_| Error::FirmwareTooLong)?
                .to_le_bytes(),
            filesystem_size: u32::try_from(filesystem.len())
                .map_err(|_| Error::FilesystemTooLong)?
                .to_le_bytes(),
        })
    }

    /// Magic number, always `GFPK`.
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// Package layout version.
    pub fn format_version(&self) -> u8 {
        self.format_version
    }

    /// The size of the firmware payload.
    pub fn firmware_size(&self) -> u32 {
        u32::from_le_bytes(self.firmware_size)
    }

    /// The size of the filesystem payload.
    pub fn filesystem_size(&self) -> u32 {
        u32::from_le_bytes(self.filesystem_size)
    }

    /// Size of the whole package: header plus both payloads.
    pub fn package_size(&self) -> u64 {
        Self::SIZE as u64 + u64::from(self.firmware_size()) + u64::from(self.filesystem_size())
    }

    /// Parse a package.
    ///
    /// If the data does not start with a package header, `None` is returned.
    pub fn parse(data: &[u8]) -> Result<Option<Package<'_>>, Error> {
        let Some(header) = Self::deserialize(data)? else {
            return Ok(None);
        };

        if header.format_version != PACKAGE_FORMAT_VERSION {
            return Err(Error::UnsupportedFormatVersion(header.format_version));
        }

        // Check that the reserved bytes are all zero.
        if data[Self::SIZE - Self::RESERVED..Self::SIZE].iter().any(|&b| b != 0) {
            return Err(Error::InvalidReservedBytes);
        }

        let actual = data.len() as u64;
        if header.package_size() != actual {
            return Err(Error::InvalidPackageSize {
                header: header.package_size(),
                actual,
            });
        }

        let firmware_end = Self::SIZE + header.firmware_size() as usize;
        Ok(Some(Package {
            firmware: &data[Self::SIZE..firmware_end],
            filesystem: &data[firmware_end..],
            header,
        }))
    }

    /// Serialize the header to a buffer. Exactly [`Self::SIZE`] bytes will be
    /// written.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() < Self::SIZE {
            return Err(Error::SerializeBufferTooSmall);
        }
        buf[..Self::SIZE].copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// The serialized header.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[..4].copy_from_slice(&self.magic);
        buf[4] = self.format_version;
        buf[5..9].copy_from_slice(&self.firmware_size);
        buf[9..13].copy_from_slice(&self.filesystem_size);
        // Reserved bytes stay zero.
        buf
    }

    /// Deserialize the header fields from a buffer.
    ///
    /// Returns `None` if the buffer does not contain a header.
    fn deserialize(data: &[u8]) -> Result<Option<Self>, Error> {
        if data.len() < 4 || data[..4] != PACKAGE_MAGIC {
            // Magic value is missing or not recognized, so this is not a package.
            return Ok(None);
        }

        // The data contains a header, so make sure it's of appropriate length.
        if data.len() < Self::SIZE {
            return Err(Error::HeaderTooShort);
        }

        let mut firmware_size = [0u8; 4];
        firmware_size.copy_from_slice(&data[5..9]);
        let mut filesystem_size = [0u8; 4];
        filesystem_size.copy_from_slice(&data[9..13]);

        Ok(Some(Self {
            magic: PACKAGE_MAGIC,
            format_version: data[4],
            firmware_size,
            filesystem_size,
        }))
    }
}

/// A parsed package, borrowing its payloads from the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package<'a> {
    header: Header,
    firmware: &'a [u8],
    filesystem: &'a [u8],
}

impl<'a> Package<'a> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Firmware image, flashed to the application partition.
    pub fn firmware(&self) -> &'a [u8] {
        self.firmware
    }

    /// Filesystem image, flashed to the data partition.
    pub fn filesystem(&self) -> &'a [u8] {
        self.filesystem
    }
}

#[derive(Debug)]
pub enum Error {
    FilesystemTooLong,
    FirmwareTooLong,
    HeaderTooShort,
    InvalidPackageSize { header: u64, actual: u64 },
    InvalidReservedBytes,
    SerializeBufferTooSmall,
    UnsupportedFormatVersion(u8),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FilesystemTooLong => write!(f, "filesystem image too long"),
            Self::FirmwareTooLong => write!(f, "firmware image too long"),
            Self::HeaderTooShort => write!(f, "package header too short"),
            Self::InvalidPackageSize { header, actual } => write!(
                f,
                "invalid package size: header describes {header} bytes, but file is {actual}",
            ),
            Self::InvalidReservedBytes => write!(f, "invalid reserved bytes in header"),
            Self::SerializeBufferTooSmall => write!(f, "buffer too small for serialization"),
            Self::UnsupportedFormatVersion(version) => {
                write!(f, "unsupported package format version {version}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
