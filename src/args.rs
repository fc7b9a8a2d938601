// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI flags.

use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

use crate::constants::DEFAULT_BG_COLOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum LogLevel {
    Silent,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// Accepts the numeric `0..3` spelling alongside the named one
    /// ("silent|error|info|debug (or 0..3)").
    pub fn parse_flexible(s: &str) -> Result<Self, String> {
        match s {
            "0" => Ok(LogLevel::Silent),
            "1" => Ok(LogLevel::Error),
            "2" => Ok(LogLevel::Info),
            "3" => Ok(LogLevel::Debug),
            _ => <LogLevel as ValueEnum>::from_str(s, true),
        }
    }

    pub fn as_env_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fluxwl", about = "A Fluxbox-behaved Wayland compositor core")]
pub struct Args {
    /// Display socket name for the Wayland server.
    #[arg(long)]
    pub socket: Option<String>,

    /// Explicit IPC socket path.
    #[arg(long)]
    pub ipc_socket: Option<PathBuf>,

    /// Disable the XWayland bridge.
    #[arg(long)]
    pub no_xwayland: bool,

    /// Root background color.
    #[arg(long, default_value = "#141414")]
    pub bg_color: String,

    /// Startup command, run once after init.
    #[arg(short = 's', long = "startup", value_name = "CMD")]
    pub startup_cmd: Option<String>,

    /// Terminal spawn command.
    #[arg(long)]
    pub terminal: Option<String>,

    /// Number of workspaces (>= 1).
    #[arg(long, default_value_t = 4)]
    pub workspaces: u32,

    /// Base config directory.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Key-binding config file.
    #[arg(long)]
    pub keys: Option<PathBuf>,

    /// Apps-rules config file.
    #[arg(long)]
    pub apps: Option<PathBuf>,

    /// Style config file.
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Menu config file.
    #[arg(long)]
    pub menu: Option<PathBuf>,

    /// Log verbosity.
    #[arg(long, value_parser = LogLevel::parse_flexible, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable protocol tracing.
    #[arg(long)]
    pub log_protocol: bool,
}

impl Args {
    /// `--workspaces 0` is clamped up to 1 ("number of workspaces
    /// (≥1)").
    pub fn workspace_count(&self) -> u32 {
        self.workspaces.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["fluxwl"]);
        assert_eq!(args.bg_color, DEFAULT_BG_COLOR);
        assert_eq!(args.workspaces, 4);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.no_xwayland);
    }

    #[test]
    fn numeric_log_level_aliases_named_one() {
        let args = Args::parse_from(["fluxwl", "--log-level", "3"]);
        assert_eq!(args.log_level, LogLevel::Debug);
        let args = Args::parse_from(["fluxwl", "--log-level", "debug"]);
        assert_eq!(args.log_level, LogLevel::Debug);
    }

    #[test]
    fn workspace_count_clamps_zero_to_one() {
        let args = Args::parse_from(["fluxwl", "--workspaces", "0"]);
        assert_eq!(args.workspace_count(), 1);
    }

    #[test]
    fn startup_and_paths_parse() {
        let args = Args::parse_from(["fluxwl", "-s", "foot", "--apps", "/tmp/apps"]);
        assert_eq!(args.startup_cmd.as_deref(), Some("foot"));
        assert_eq!(args.apps, Some(PathBuf::from("/tmp/apps")));
    }
}
