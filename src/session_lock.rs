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

//! `ext-session-lock-v1` state machine. `new_lock` fans out one lock
//! surface per output and waits for every one of them to commit a
//! buffer before the `locked` event may fire exactly once; an output
//! destroyed mid-lock shrinks the expected count instead of blocking
//! forever.

use std::collections::HashSet;

use crate::outputs::OutputId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewLockOutcome {
    Rejected,
    Started { expected_surfaces: usize },
}

/// A lock surface per output, configured to that output's dimensions
/// (or the fallback size if unknown) and tracked until it commits a
/// buffer.
#[derive(Debug, Default)]
pub struct SessionLock {
    active: bool,
    expected_surfaces: usize,
    committed: HashSet<OutputId>,
    sent_locked: bool,
}

impl SessionLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sent_locked(&self) -> bool {
        self.sent_locked
    }

    /// Starts a new lock. Rejects if one is already active.
    /// `output_count` is clamped to at least 1:
    /// `expected_surfaces = max(outputs.count(), 1)`.
    pub fn new_lock(&mut self, output_count: usize) -> NewLockOutcome {
        if self.active {
            return NewLockOutcome::Rejected;
        }
        self.active = true;
        self.expected_surfaces = output_count.max(1);
        self.committed.clear();
        self.sent_locked = false;
        NewLockOutcome::Started { expected_surfaces: self.expected_surfaces }
    }

    /// The target size for a new lock surface on `output`: its full
    /// area if known, else the crate's default fallback.
    pub fn surface_size(output_area: Option<(i32, i32)>) -> (i32, i32) {
        output_area.unwrap_or(crate::constants::DEFAULT_LOCK_SURFACE_SIZE)
    }

    /// A lock surface committed its first buffer. Returns `true` the
    /// one time this causes `locked` to fire.
    pub fn surface_committed(&mut self, output: OutputId) -> bool {
        if !self.active || self.sent_locked {
            return false;
        }
        self.committed.insert(output);
        self.check_locked()
    }

    /// An output was destroyed while locked. Shrinks the expected
    /// count and any already-recorded commit for it, then re-checks
    /// whether `locked` can now fire.
    pub fn output_destroyed(&mut self, output: OutputId) -> bool {
        if !self.active || self.sent_locked {
            return false;
        }
        self.expected_surfaces = self.expected_surfaces.saturating_sub(1);
        self.committed.remove(&output);
        self.check_locked()
    }

    fn check_locked(&mut self) -> bool {
        if !self.sent_locked && self.committed.len() >= self.expected_surfaces && self.expected_surfaces > 0 {
            self.sent_locked = true;
            return true;
        }
        false
    }

    /// Destroys the lock and reverts state.
    pub fn unlock(&mut self) {
        *self = Self::default();
    }
}
