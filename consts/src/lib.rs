// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]

/// Magic number at the start of every combined update package.
/// The device refuses any update file that does not start with these bytes.
pub const PACKAGE_MAGIC: [u8; 4] = *b"GFPK";

/// Current version of the combined update package layout.
pub const PACKAGE_FORMAT_VERSION: u8 = 1;

/// Size of the package header in bytes.
/// magic (4) + format version (1) + firmware size (4) + filesystem size (4) + reserved (3)
pub const PACKAGE_HEADER_SIZE: usize = 16;

/// Number of zeroed bytes at the end of the package header.
pub const PACKAGE_RESERVED_SIZE: usize = 3;

/// Firmware image produced by PlatformIO inside the build directory.
pub const FIRMWARE_BIN: &str = "firmware.bin";

/// LittleFS image produced by `pio run -t buildfs` inside the build directory.
pub const FILESYSTEM_BIN: &str = "littlefs.bin";

/// Combined update package written next to the images.
pub const PACKAGE_FILE: &str = "system.gfpkg";

/// PlatformIO environment used when none is configured.
pub const DEFAULT_PIO_ENV: &str = "wemos_d1_mini32";

/// PlatformIO platform identifiers and the HAL subtree each one compiles.
/// The tag is both the `hal/<tag>` directory name and, uppercased, the
/// preprocessor define.
pub const HAL_PLATFORMS: [(&str, &str); 2] = [("espressif32", "esp32"), ("espressif8266", "esp8266")];
