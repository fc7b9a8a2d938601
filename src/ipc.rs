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

//! The IPC command loop: socket path derivation, the
//! per-connection line accumulator, and command parse/dispatch. The
//! accept loop itself (binding the `AF_UNIX` socket, reading from a
//! live connection) lives in `server/mod.rs`; this module is the part
//! that can be unit tested without a socket.

use std::path::Path;
use std::path::PathBuf;

use crate::constants::IPC_MAX_LINE;
use crate::utils::sanitize_path_component;

/// `$XDG_RUNTIME_DIR/fluxbox-wayland-ipc-<sanitized-socket>.sock`,
/// or `explicit` verbatim if the caller passed `--ipc-socket`.
pub fn socket_path(explicit: Option<&Path>, xdg_runtime_dir: &str, wayland_display: &str) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let basis = if wayland_display.is_empty() { "wayland-0" } else { wayland_display };
    let sanitized = sanitize_path_component(basis);
    Path::new(xdg_runtime_dir).join(format!("fluxbox-wayland-ipc-{sanitized}.sock"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    TooLong,
}

/// Feeds `chunk` into `buf`, returning the completed line (without its
/// trailing `\n`) once one is seen. Enforces the per-connection 1024
/// byte cap ("overflow → `err line_too_long` and close").
pub fn accumulate_line(buf: &mut Vec<u8>, chunk: &[u8]) -> Result<Option<String>, LineError> {
    for &b in chunk {
        if b == b'\n' {
            let line = String::from_utf8_lossy(buf).into_owned();
            buf.clear();
            return Ok(Some(line));
        }
        buf.push(b);
        if buf.len() > IPC_MAX_LINE {
            return Err(LineError::TooLong);
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Reconfigure,
    DumpConfig,
    Quit,
    GetWorkspace,
    Workspace(i64),
    NextWorkspace,
    PrevWorkspace,
    NextWindow,
    Unknown,
}

/// Parses one command line, case-insensitive on the verb. Commands are
/// single newline-delimited lines; a couple of harmless read-only
/// aliases are accepted: `dumpconfig` for `dump-config`, `getworkspace`
/// for `get-workspace`.
pub fn parse(line: &str) -> Command {
    let mut words = line.trim().split_whitespace();
    let Some(verb) = words.next() else { return Command::Unknown };
    match verb.to_ascii_lowercase().as_str() {
        "ping" => Command::Ping,
        "reconfigure" | "reconfig" => Command::Reconfigure,
        "dump-config" | "dumpconfig" => Command::DumpConfig,
        "quit" | "exit" => Command::Quit,
        "get-workspace" | "getworkspace" => Command::GetWorkspace,
        "workspace" => match words.next().and_then(|n| n.parse::<i64>().ok()) {
            Some(n) => Command::Workspace(n),
            None => Command::Unknown,
        },
        "nextworkspace" => Command::NextWorkspace,
        "prevworkspace" => Command::PrevWorkspace,
        "nextwindow" | "focus-next" => Command::NextWindow,
        _ => Command::Unknown,
    }
}

/// 1-based current/total workspace count backing `workspace=M` replies
/// and `nextworkspace`/`prevworkspace` wrap semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceState {
    count: usize,
    current: usize,
}

impl WorkspaceState {
    pub fn new(count: usize) -> Self {
        Self { count: count.max(1), current: 1 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `true` if `n` was in range and applied.
    pub fn set(&mut self, n: usize) -> bool {
        if n >= 1 && n <= self.count {
            self.current = n;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        self.current = if self.current >= self.count { 1 } else { self.current + 1 };
    }

    pub fn prev(&mut self) {
        self.current = if self.current <= 1 { self.count } else { self.current - 1 };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub keys_file: String,
    pub apps_file: String,
    pub style_file: String,
    pub menu_file: String,
}

fn dump_config_reply(paths: &ConfigPaths, ws: &WorkspaceState) -> String {
    format!(
        "ok keys_file={} apps_file={} style_file={} menu_file={} workspaces={} current={}",
        paths.keys_file,
        paths.apps_file,
        paths.style_file,
        paths.menu_file,
        ws.count(),
        ws.current(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Reply to write back; connection then closes normally.
    Reply(String),
    /// Reply to write back, then terminate the event loop.
    Quit(String),
}

/// Runs one parsed command against live workspace state. One
/// connection serves exactly one command.
pub fn dispatch(cmd: Command, ws: &mut WorkspaceState, paths: &ConfigPaths) -> DispatchOutcome {
    match cmd {
        Command::Ping => DispatchOutcome::Reply("ok pong".into()),
        Command::Reconfigure => DispatchOutcome::Reply("ok reconfigure".into()),
        Command::DumpConfig => DispatchOutcome::Reply(dump_config_reply(paths, ws)),
        Command::Quit => DispatchOutcome::Quit("ok quitting".into()),
        Command::GetWorkspace => DispatchOutcome::Reply(format!("ok workspace={}", ws.current())),
        Command::Workspace(n) => {
            if n >= 1 && ws.set(n as usize) {
                DispatchOutcome::Reply(format!("ok workspace={n}"))
            } else {
                DispatchOutcome::Reply("err workspace_out_of_range".into())
            }
        },
        Command::NextWorkspace => {
            ws.next();
            DispatchOutcome::Reply("ok".into())
        },
        Command::PrevWorkspace => {
            ws.prev();
            DispatchOutcome::Reply("ok".into())
        },
        Command::NextWindow => DispatchOutcome::Reply("ok".into()),
        Command::Unknown => DispatchOutcome::Reply("err unknown_command".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ConfigPaths {
        ConfigPaths {
            keys_file: "/etc/fluxwl/keys".into(),
            apps_file: "/etc/fluxwl/apps".into(),
            style_file: "/etc/fluxwl/style".into(),
            menu_file: "/etc/fluxwl/menu".into(),
        }
    }

    #[test]
    fn scenario_s1_ipc_roundtrip() {
        let mut ws = WorkspaceState::new(4);
        let p = paths();

        assert_eq!(dispatch(parse("ping"), &mut ws, &p), DispatchOutcome::Reply("ok pong".into()));
        assert_eq!(dispatch(parse("get-workspace"), &mut ws, &p), DispatchOutcome::Reply("ok workspace=1".into()));
        assert_eq!(dispatch(parse("workspace 3"), &mut ws, &p), DispatchOutcome::Reply("ok workspace=3".into()));
        assert_eq!(dispatch(parse("workspace 99"), &mut ws, &p), DispatchOutcome::Reply("err workspace_out_of_range".into()));
        assert_eq!(dispatch(parse("nextworkspace"), &mut ws, &p), DispatchOutcome::Reply("ok".into()));
        assert_eq!(ws.current(), 4);
        assert_eq!(dispatch(parse("nextworkspace"), &mut ws, &p), DispatchOutcome::Reply("ok".into()));
        assert_eq!(ws.current(), 1);
        assert_eq!(dispatch(parse("unknown"), &mut ws, &p), DispatchOutcome::Reply("err unknown_command".into()));
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(parse("  PING  "), Command::Ping);
        assert_eq!(parse("Workspace 2"), Command::Workspace(2));
    }

    #[test]
    fn quit_and_exit_both_request_shutdown() {
        let mut ws = WorkspaceState::new(1);
        let p = paths();
        assert_eq!(dispatch(parse("quit"), &mut ws, &p), DispatchOutcome::Quit("ok quitting".into()));
        assert_eq!(dispatch(parse("exit"), &mut ws, &p), DispatchOutcome::Quit("ok quitting".into()));
    }

    #[test]
    fn dump_config_reports_paths_and_workspaces() {
        let mut ws = WorkspaceState::new(4);
        ws.set(2);
        let reply = dump_config_reply(&paths(), &ws);
        assert_eq!(reply, "ok keys_file=/etc/fluxwl/keys apps_file=/etc/fluxwl/apps style_file=/etc/fluxwl/style menu_file=/etc/fluxwl/menu workspaces=4 current=2");
    }

    #[test]
    fn socket_path_sanitizes_and_falls_back_to_explicit() {
        let p = socket_path(None, "/run/user/1000", "wayland-fluxtest!");
        assert_eq!(p, PathBuf::from("/run/user/1000/fluxbox-wayland-ipc-wayland-fluxtest_.sock"));
        let explicit = Path::new("/tmp/custom.sock");
        assert_eq!(socket_path(Some(explicit), "/run/user/1000", "wayland-0"), PathBuf::from("/tmp/custom.sock"));
    }

    #[test]
    fn accumulate_line_splits_on_newline() {
        let mut buf = Vec::new();
        assert_eq!(accumulate_line(&mut buf, b"pi"), Ok(None));
        assert_eq!(accumulate_line(&mut buf, b"ng\n"), Ok(Some("ping".to_string())));
        assert!(buf.is_empty());
    }

    #[test]
    fn accumulate_line_rejects_overflow() {
        let mut buf = Vec::new();
        let long = vec![b'x'; IPC_MAX_LINE + 1];
        assert_eq!(accumulate_line(&mut buf, &long), Err(LineError::TooLong));
    }

    #[test]
    fn negative_workspace_number_is_out_of_range() {
        let mut ws = WorkspaceState::new(4);
        let p = paths();
        assert_eq!(dispatch(parse("workspace -1"), &mut ws, &p), DispatchOutcome::Reply("err workspace_out_of_range".into()));
    }
}
