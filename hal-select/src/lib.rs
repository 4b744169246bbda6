// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Picks the hardware abstraction layer for the platform being built.
//!
//! Platform specific sources live under `hal/<tag>/`. For a known platform
//! only its own subtree is compiled and `<TAG>=1` is defined. Unknown
//! platforms keep whatever source selection the build already has.

use consts::HAL_PLATFORMS;


/// The parts of the host build environment the selector touches.
pub trait BuildEnv {
    /// Identifier of the platform being built, e.g. `espressif32`.
    fn platform(&self) -> Option<String>;

    /// Add a preprocessor define.
    fn append_define(&mut self, name: &str, value: &str);

    /// Replace the active source filter.
    fn replace_src_filter(&mut self, filter: &[String]);
}

/// HAL tag for a platform identifier.
pub fn lookup(platform: &str) -> Option<&'static str> {
    HAL_PLATFORMS
        .iter()
        .find(|(id, _)| *id == platform)
        .map(|(_, tag)| *tag)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub tag: &'static str,
    pub defines: Vec<(String, String)>,
    pub src_filter: Vec<String>,
}

impl Selection {
    pub fn for_platform(platform: &str) -> Option<Self> {
        let tag = lookup(platform)?;
        Some(Self {
            tag,
            defines: vec![(tag.to_uppercase(), "1".to_owned())],
            // Drop every HAL subtree, then add back the selected one.
            src_filter: vec!["+<*> -<hal/*>".to_owned(), format!("+<hal/**/{tag}>")],
        })
    }
}

/// Configure `env` for its platform.
///
/// Returns what was applied, or `None` if the platform is unknown, in which
/// case `env` is left untouched.
pub fn apply(env: &mut impl BuildEnv) -> Option<Selection> {
    let Some(platform) = env.platform() else {
        tracing::debug!("no build platform set, keeping default sources");
        return None;
    };
    let Some(selection) = Selection::for_platform(&platform) else {
        tracing::debug!("no HAL for platform {platform}, keeping default sources");
        return None;
    };

    tracing::info!(
        "building HAL for: {} with flags {:?} and source filter {:?}",
        selection.tag,
        selection.defines,
        selection.src_filter
    );
    for (name, value) in &selection.defines {
        env.append_define(name, value);
    }
    env.replace_src_filter(&selection.src_filter);
    Some(selection)
}
