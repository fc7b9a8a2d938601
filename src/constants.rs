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

use std::time::Duration;

/// Manhattan-distance threshold before a pressed mouse binding's `move`
/// action fires.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

/// Key-chain timeout: a keychain prefix mode reverts to the parent mode
/// if no key matches within this window (step 6).
pub const KEYCHAIN_TIMEOUT: Duration = Duration::from_millis(5000);

/// IPC per-connection line length cap.
pub const IPC_MAX_LINE: usize = 1024;

/// Command dialog input cap in bytes.
pub const CMD_DIALOG_MAX_BYTES: usize = 4096;

/// Default background color, used when `--bg-color` is absent.
pub const DEFAULT_BG_COLOR: &str = "#141414";

/// Default lock-surface dimensions when the target output's mode is not
/// yet known.
pub const DEFAULT_LOCK_SURFACE_SIZE: (i32, i32) = (1280, 720);

/// Fallback shell for `--terminal`/restart when `$SHELL` is unset.
pub const FALLBACK_SHELL: &str = "/bin/sh";

/// Default OSD auto-hide delay when the theme doesn't override it.
pub const OSD_DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(1500);
