// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

use hal_select::BuildEnv;
use std::fmt;

/// Collects the HAL selection as a PlatformIO config fragment, meant to be
/// pulled in through `extra_configs`.
#[derive(Debug, Default)]
pub struct PioConfig {
    platform: Option<String>,
    build_flags: Vec<String>,
    src_filter: Option<Vec<String>>,
}

impl PioConfig {
    pub fn new(platform: Option<String>) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }
}

impl BuildEnv for PioConfig {
    fn platform(&self) -> Option<String> {
        self.platform.clone()
    }

    fn append_define(&mut self, name: &str, value: &str) {
        self.build_flags.push(format!("-D {name}={value}"));
    }

    fn replace_src_filter(&mut self, filter: &[String]) {
        self.src_filter = Some(filter.to_vec());
    }
}

impl fmt::Display for PioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[env]")?;
        if !self.build_flags.is_empty() {
            writeln!(f, "build_flags = {}", self.build_flags.join(" "))?;
        }
        if let Some(filter) = &self.src_filter {
            writeln!(f, "build_src_filter = {}", filter.join(" "))?;
        }
        Ok(())
    }
}
