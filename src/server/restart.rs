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

//! Restart/exec semantics: "On restart, if `restart_cmd` is
//! set, `exec` a shell with it; else `exec` the self-argv." The actual
//! `execvp` replaces this process, so only [`plan`] is unit tested;
//! [`exec`] is exercised by hand at the call site in `main.rs`.

use std::convert::Infallible;
use std::ffi::CString;

use crate::prelude::*;

/// The argv a restart should `exec`, without performing it.
pub fn plan(restart_cmd: Option<&str>, shell: &str, self_argv: &[String]) -> Vec<String> {
    match restart_cmd {
        Some(cmd) if !cmd.is_empty() => vec![shell.to_string(), "-c".to_string(), cmd.to_string()],
        _ => self_argv.to_vec(),
    }
}

/// Replaces the current process image with `argv` (teardown the
/// aggregate first, then `exec` the successor). Returns only on
/// failure; a successful call never returns.
#[instrument(skip(argv), level = "debug")]
pub fn exec(argv: &[String]) -> Result<Infallible> {
    let cstrs: Vec<CString> = argv
        .iter()
        .map(|s| CString::new(s.as_str()))
        .collect::<std::result::Result<_, _>>()
        .location(loc!())?;
    nix::unistd::execvp(&cstrs[0], &cstrs).location(loc!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_cmd_runs_through_shell() {
        let argv = plan(Some("foo --bar"), "/bin/sh", &["fluxwl".to_string()]);
        assert_eq!(argv, vec!["/bin/sh", "-c", "foo --bar"]);
    }

    #[test]
    fn empty_restart_cmd_falls_back_to_self_argv() {
        let self_argv = vec!["fluxwl".to_string(), "--socket".to_string(), "wayland-1".to_string()];
        assert_eq!(plan(None, "/bin/sh", &self_argv), self_argv);
        assert_eq!(plan(Some(""), "/bin/sh", &self_argv), self_argv);
    }
}
