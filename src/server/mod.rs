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

//! The `Server` aggregate: all state lives in one aggregate passed by
//! mutable reference to handlers. Owns
//! every policy subsystem built elsewhere in this crate; real Wayland
//! resources (the smithay backend, scene graph, XWayland handle) are
//! integration points this module wires up but does not itself
//! implement, matching the split every other module in this crate
//! already keeps between policy and backend glue.

pub mod restart;

use std::path::Path;
use std::path::PathBuf;

use crate::args::Args;
use crate::color::parse_color;
use crate::color::Rgba;
use crate::focus::keys::KeyBindingEngine;
use crate::focus::mousebind::MouseBindState;
use crate::focus::mousebind::MouseBindingTable;
use crate::focus::pointer::PointerConstraints;
use crate::focus::FocusState;
use crate::grab::Grab;
use crate::ipc;
use crate::menu::MenuStack;
use crate::cmd_dialog::CmdDialog;
use crate::osd::Osd;
use crate::outputs::OutputRegistry;
use crate::prelude::*;
use crate::rules::persist;
use crate::rules::RuleSet;
use crate::session_lock::SessionLock;
use crate::shortcuts_inhibit::ShortcutsInhibitor;
use crate::text_input::TextInputBridge;
use crate::utils::Arena;
use crate::view::View;
use crate::view::ViewId;

/// Resolved config file paths (each defaults under
/// `--config-dir` when not given explicitly).
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub keys_file: PathBuf,
    pub apps_file: PathBuf,
    pub style_file: PathBuf,
    pub menu_file: PathBuf,
}

impl ResolvedConfig {
    pub fn resolve(args: &Args, config_dir_default: &Path) -> Self {
        let dir = args.config_dir.as_deref().unwrap_or(config_dir_default);
        Self {
            keys_file: args.keys.clone().unwrap_or_else(|| dir.join("keys")),
            apps_file: args.apps.clone().unwrap_or_else(|| dir.join("apps")),
            style_file: args.style.clone().unwrap_or_else(|| dir.join("style")),
            menu_file: args.menu.clone().unwrap_or_else(|| dir.join("menu")),
        }
    }

    fn to_ipc_paths(&self) -> ipc::ConfigPaths {
        ipc::ConfigPaths {
            keys_file: self.keys_file.display().to_string(),
            apps_file: self.apps_file.display().to_string(),
            style_file: self.style_file.display().to_string(),
            menu_file: self.menu_file.display().to_string(),
        }
    }
}

/// The aggregate. Every handler in this crate (IPC dispatch, key/mouse
/// pipelines, grab updates) takes `&mut Server`.
pub struct Server {
    pub config: ResolvedConfig,
    pub bg_color: Rgba,
    pub outputs: OutputRegistry,
    pub views: Arena<ViewId, View>,
    pub rules: RuleSet,
    pub focus: FocusState,
    pub key_engine: KeyBindingEngine,
    pub mouse_table: MouseBindingTable,
    pub mouse_state: MouseBindState,
    pub pointer_constraints: PointerConstraints,
    pub grab: Grab,
    pub menu: MenuStack,
    pub cmd_dialog: CmdDialog,
    pub osd: Osd,
    pub session_lock: SessionLock,
    pub text_input: TextInputBridge,
    pub shortcuts_inhibit: ShortcutsInhibitor,
    pub workspaces: ipc::WorkspaceState,
    pub no_xwayland: bool,
    pub running: bool,
}

impl Server {
    /// Bootstraps policy state from CLI args ("Config files
    /// are best-effort; a missing apps file is not fatal"). Fatal
    /// bootstrap failures (backend/scene/protocol managers, IPC socket
    /// bind) are the caller's responsibility in `main.rs`, which alone
    /// touches those resources.
    #[instrument(skip(args), level = "debug")]
    pub fn bootstrap(args: &Args, config_dir_default: &Path) -> Result<Self> {
        let config = ResolvedConfig::resolve(args, config_dir_default);
        let bg_color = parse_color(&args.bg_color).unwrap_or_else(|| {
            warn!("invalid --bg-color {:?}, using default", args.bg_color);
            parse_color(crate::constants::DEFAULT_BG_COLOR).expect("default color always parses")
        });

        let rules = match persist::load(&config.apps_file) {
            Ok(set) => set,
            Err(e) => {
                info!("apps file not loaded ({e}); starting with an empty rule set");
                RuleSet::new()
            },
        };

        Ok(Self {
            config,
            bg_color,
            outputs: OutputRegistry::new(),
            views: Arena::new(),
            rules,
            focus: FocusState::new(crate::focus::FocusModel::default(), true, 250),
            key_engine: KeyBindingEngine::new(),
            mouse_table: MouseBindingTable::new(),
            mouse_state: MouseBindState::new(),
            pointer_constraints: PointerConstraints::new(),
            grab: Grab::new(),
            menu: MenuStack::new(),
            cmd_dialog: CmdDialog::new(),
            osd: Osd::default(),
            session_lock: SessionLock::new(),
            text_input: TextInputBridge::new(),
            shortcuts_inhibit: ShortcutsInhibitor::new(),
            workspaces: ipc::WorkspaceState::new(args.workspace_count() as usize),
            no_xwayland: args.no_xwayland,
            running: true,
        })
    }

    pub fn ipc_config_paths(&self) -> ipc::ConfigPaths {
        self.config.to_ipc_paths()
    }

    /// Runs one IPC command, applying it to live workspace state and
    /// stopping the event loop on `quit`/`exit`.
    pub fn handle_ipc(&mut self, line: &str) -> String {
        let cmd = ipc::parse(line);
        let paths = self.ipc_config_paths();
        match ipc::dispatch(cmd, &mut self.workspaces, &paths) {
            ipc::DispatchOutcome::Reply(reply) => reply,
            ipc::DispatchOutcome::Quit(reply) => {
                self.running = false;
                reply
            },
        }
    }

    /// The ordered teardown sequence. Each name corresponds to one
    /// step; `teardown()` performs the ones this crate's core owns
    /// and logs the rest as integration points for the backend glue
    /// in `main.rs`.
    pub const TEARDOWN_ORDER: &'static [&'static str] = &[
        "stop_tray_helper",
        "persist_slit_list",
        "disconnect_clients",
        "unlink_listeners",
        "destroy_ui_widgets",
        "destroy_xwayland",
        "destroy_scene",
        "destroy_backend_resources",
        "free_rule_and_binding_vectors",
        "destroy_event_loop",
    ];

    #[instrument(skip(self), level = "debug")]
    pub fn teardown(&mut self) -> Result<()> {
        for step in Self::TEARDOWN_ORDER {
            debug!(step, "teardown step");
            match *step {
                "persist_slit_list" => {
                    if self.rules.rewrite_safe {
                        persist::save(&self.rules, &self.config.apps_file).location(loc!())?;
                    }
                },
                "disconnect_clients" => {
                    self.views = Arena::new();
                },
                "free_rule_and_binding_vectors" => {
                    self.rules = RuleSet::new();
                },
                // The remaining steps (tray helper, UI widgets, XWayland,
                // scene, backend resources, event loop) act on live
                // smithay/backend handles this crate's core does not own;
                // `main.rs` runs the equivalent teardown against those.
                _ => {},
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        use clap::Parser as _;
        let mut argv = vec!["fluxwl"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn bootstrap_with_missing_apps_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::bootstrap(&args(&["--config-dir", dir.path().to_str().unwrap()]), dir.path()).unwrap();
        assert_eq!(server.rules.rules().len(), 0);
        assert!(server.running);
    }

    #[test]
    fn invalid_bg_color_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::bootstrap(&args(&["--bg-color", "not-a-color"]), dir.path()).unwrap();
        assert_eq!(server.bg_color, parse_color(crate::constants::DEFAULT_BG_COLOR).unwrap());
    }

    #[test]
    fn ipc_quit_stops_the_server() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::bootstrap(&args(&[]), dir.path()).unwrap();
        assert_eq!(server.handle_ipc("ping"), "ok pong");
        assert!(server.running);
        assert_eq!(server.handle_ipc("quit"), "ok quitting");
        assert!(!server.running);
    }

    #[test]
    fn teardown_runs_every_step_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::bootstrap(&args(&["--config-dir", dir.path().to_str().unwrap()]), dir.path()).unwrap();
        server.teardown().unwrap();
        assert_eq!(server.rules.rules().len(), 0);
    }
}
