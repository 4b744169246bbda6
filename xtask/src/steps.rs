// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// An external command the pipeline depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl BuildStep {
    pub fn new(program: impl Into<String>, args: &[&str], current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            current_dir: current_dir.into(),
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, " (in {})", self.current_dir.display())
    }
}

/// Exit status of a step. `None` when the process was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus(pub Option<i32>);

impl StepStatus {
    pub const SUCCESS: Self = Self(Some(0));

    pub fn success(&self) -> bool {
        self.0 == Some(0)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Runs build steps to completion.
pub trait StepRunner {
    fn run(&mut self, step: &BuildStep) -> std::io::Result<StepStatus>;
}

/// Runs steps as child processes, blocking until they exit.
pub struct ProcessRunner {
    pub verbose: bool,
}

impl StepRunner for ProcessRunner {
    fn run(&mut self, step: &BuildStep) -> std::io::Result<StepStatus> {
        let mut cmd = Command::new(&step.program);
        cmd.current_dir(&step.current_dir).args(&step.args);
        // Only stdout is silenced, build errors still reach the terminal.
        if !self.verbose {
            cmd.stdout(Stdio::null());
        }
        let status = cmd.status()?;
        Ok(StepStatus(status.code()))
    }
}
