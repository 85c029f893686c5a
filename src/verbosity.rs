// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Engine verbosity levels and their `tracing` filters.

use std::fmt;
use std::str::FromStr;

/// How much the driver logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    Error,
    Alert,
    #[default]
    Print,
    Debug,
    Trace,
}

impl Verbosity {
    /// Returns the `EnvFilter` directive for this level.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "off",
            Verbosity::Error => "error",
            Verbosity::Alert => "warn",
            Verbosity::Print => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }

    /// Parses a level name, falling back to the default for unknown names.
    pub fn from_name(name: Option<&str>) -> Verbosity {
        name.and_then(|name| name.parse().ok()).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown verbosity level {0}")]
pub struct UnknownVerbosity(String);

impl FromStr for Verbosity {
    type Err = UnknownVerbosity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "quiet" => Verbosity::Quiet,
            "error" => Verbosity::Error,
            "alert" => Verbosity::Alert,
            "print" => Verbosity::Print,
            "debug" => Verbosity::Debug,
            "trace" => Verbosity::Trace,
            _ => return Err(UnknownVerbosity(s.to_string())),
        })
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Error => "error",
            Verbosity::Alert => "alert",
            Verbosity::Print => "print",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        };
        f.write_str(name)
    }
}
