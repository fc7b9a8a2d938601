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

//! Error-handling conventions shared across every component: a fallible
//! operation returns `anyhow::Result`, the call site tags it with
//! `.location(loc!())` for a breadcrumb in the log, and boundaries that
//! may not propagate (event-loop callbacks, listener teardown) use
//! `log_and_ignore` instead of `?`.

pub use anyhow::anyhow;
pub use anyhow::Context;
pub use anyhow::Result;
pub use tracing::debug;
pub use tracing::error;
pub use tracing::info;
pub use tracing::instrument;
pub use tracing::trace;
pub use tracing::warn;

pub use crate::fallible_entry::FallibleEntryExt;

/// `file:line` breadcrumb, attached to an error as it propagates.
#[macro_export]
macro_rules! loc {
    () => {
        concat!(file!(), ":", line!())
    };
}

pub trait ResultExt<T> {
    /// Tag an error with the call site it passed through. Cheap to call
    /// repeatedly along a `?` chain; each layer adds one more `at`.
    fn location(self, loc: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn location(self, loc: &'static str) -> Result<T> {
        self.map_err(|e| anyhow!("{e} (at {loc})"))
    }
}

pub trait LogAndIgnoreExt {
    /// For callbacks that can't propagate failure: log at `error` and
    /// drop it.
    fn log_and_ignore(self, loc: &'static str);
}

impl<T, E> LogAndIgnoreExt for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn log_and_ignore(self, loc: &'static str) {
        if let Err(e) = self {
            error!("{e} (at {loc})");
        }
    }
}

/// Evaluate a `Result`, logging and returning from the enclosing
/// function (which must return `()`) on error.
#[macro_export]
macro_rules! log_and_return {
    ($result:expr) => {
        match $result {
            Ok(v) => v,
            Err(e) => {
                $crate::prelude::error!("{e}");
                return;
            },
        }
    };
}
