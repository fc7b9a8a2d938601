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

//! Core library for the compositor binary in `main.rs`. Split out as a
//! library crate so integration tests in `tests/` can exercise the
//! policy modules without spinning up a real Wayland backend.

pub mod args;
pub mod cmd_dialog;
pub mod color;
pub mod constants;
pub mod fallible_entry;
pub mod focus;
pub mod geometry;
pub mod grab;
pub mod ipc;
pub mod menu;
pub mod osd;
pub mod outputs;
pub mod placement;
pub mod prelude;
pub mod rules;
pub mod server;
pub mod session_lock;
pub mod shortcuts_inhibit;
pub mod text_input;
pub mod utils;
pub mod view;
pub mod xwayland;
