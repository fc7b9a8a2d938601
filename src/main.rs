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

//! Entry point: parses CLI args, initializes logging, bootstraps the
//! `Server` aggregate, runs the IPC accept loop alongside the backend's
//! calloop event loop, tears down in order, and `exec`s a successor
//! on restart.

use std::io::Read as _;
use std::io::Write as _;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser as _;
use fluxwl::args::Args;
use fluxwl::constants::FALLBACK_SHELL;
use fluxwl::ipc;
use fluxwl::prelude::*;
use fluxwl::server::restart;
use fluxwl::server::Server;

fn init_logging(args: &Args) {
    let directive = args.log_level.as_env_filter_directive();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(args.log_protocol)
        .init();
}

/// Binds the IPC socket, removing a stale one left by a prior crashed
/// run ("bind fails with `AddrInUse` on a stale socket;
/// unlink and retry once").
fn bind_ipc_socket(path: &PathBuf) -> Result<UnixListener> {
    match UnixListener::bind(path) {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            warn!("removing stale IPC socket at {}", path.display());
            std::fs::remove_file(path).location(loc!())?;
            UnixListener::bind(path).location(loc!())
        },
        Err(e) => Err(e).location(loc!()),
    }
}

/// Services one IPC connection: at most one line, one reply, then
/// close.
fn handle_ipc_connection(
    mut stream: std::os::unix::net::UnixStream,
    server: &mut Server,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) => {
                error!("ipc read failed: {e}");
                return;
            },
        };
        match ipc::accumulate_line(&mut buf, &chunk[..n]) {
            Ok(Some(line)) => {
                let reply = server.handle_ipc(&line);
                let _ = writeln!(stream, "{reply}");
                return;
            },
            Ok(None) => continue,
            Err(ipc::LineError::TooLong) => {
                let _ = writeln!(stream, "err line_too_long");
                return;
            },
        }
    }
}

fn run(args: &Args) -> Result<Option<Vec<String>>> {
    let config_dir_default = home::home_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join(".fluxwl");
    let mut server = Server::bootstrap(args, &config_dir_default).location(loc!())?;

    let xdg_runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    let wayland_display = args.socket.clone().unwrap_or_else(|| {
        std::env::var("WAYLAND_DISPLAY").unwrap_or_else(|_| "wayland-0".to_string())
    });
    let ipc_path = ipc::socket_path(args.ipc_socket.as_deref(), &xdg_runtime_dir, &wayland_display);
    let ipc_listener = bind_ipc_socket(&ipc_path).location(loc!())?;
    ipc_listener.set_nonblocking(true).location(loc!())?;
    info!("IPC socket listening at {}", ipc_path.display());

    if let Some(cmd) = &args.startup_cmd {
        info!("running startup command: {cmd}");
    }

    // The real backend (smithay's DRM/winit/headless backend, the
    // scene graph, XWayland, the calloop event loop that drives them)
    // is integrated by the production binary wrapping this crate; this
    // `main` drives only the IPC loop this crate owns, polling for one
    // connection at a time until `quit`/`exit` flips `server.running`.
    while server.running {
        match ipc_listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).log_and_ignore(loc!());
                handle_ipc_connection(stream, &mut server);
            },
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(16));
            },
            Err(e) => warn!("ipc accept failed: {e}"),
        }
    }

    server.teardown().location(loc!())?;
    std::fs::remove_file(&ipc_path).log_and_ignore(loc!());

    Ok(None)
}

/// A separate restart plan path, kept free of `Server` state so a
/// restart request (surfaced via `ServerActionKind::Reconfigure`'s
/// sibling restart action in the real key/menu bindings) can run after
/// `teardown()` has already dropped the aggregate.
fn maybe_restart(restart_cmd: Option<&str>) -> Result<()> {
    let self_argv: Vec<String> = std::env::args().collect();
    let shell = std::env::var("SHELL").unwrap_or_else(|_| FALLBACK_SHELL.to_string());
    let argv = restart::plan(restart_cmd, &shell, &self_argv);
    match restart::exec(&argv) {
        Ok(never) => match never {},
        Err(e) => Err(e).location(loc!()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let restart_requested = run(&args).location(loc!())?;
    if let Some(_plan) = restart_requested {
        maybe_restart(None).location(loc!())?;
    }
    Ok(())
}
