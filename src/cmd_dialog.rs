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

//! The single-line command dialog: a text entry shown at
//! the top-center of the layout's center output. Submission is driven
//! by the caller through [`CmdDialog::submit`] rather than a stored
//! callback, since this crate's core stays free of boxed closures tied
//! to a live `Server`.

use crate::constants::CMD_DIALOG_MAX_BYTES;
use crate::focus::keys::backspace_codepoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dialog stays open; text changed.
    Edited,
    /// Dialog stays open; key had no effect (e.g. buffer full).
    NoOp,
    /// Dialog should close. `true` if the caller should run submit.
    Close { submit: bool },
}

/// Open/closed text-entry state. Opening closes any open
/// menu; that cross-module effect is the caller's responsibility, not
/// this struct's.
#[derive(Debug, Default)]
pub struct CmdDialog {
    open: bool,
    text: String,
}

impl CmdDialog {
    pub fn new() -> Self {
        Self { open: false, text: String::new() }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn open(&mut self) {
        self.open = true;
        self.text.clear();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.text.clear();
    }

    /// Dispatches one key. Returns [`Outcome::NoOp`] if the dialog
    /// isn't open.
    pub fn key(&mut self, key: Key) -> Outcome {
        if !self.open {
            return Outcome::NoOp;
        }
        match key {
            Key::Escape => {
                self.close();
                Outcome::Close { submit: false }
            },
            Key::Enter => {
                self.open = false;
                Outcome::Close { submit: true }
            },
            Key::Backspace => {
                if self.text.is_empty() {
                    Outcome::NoOp
                } else {
                    backspace_codepoint(&mut self.text);
                    Outcome::Edited
                }
            },
            Key::Char(c) => {
                if c.is_control() {
                    return Outcome::NoOp;
                }
                let mut buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut buf);
                if self.text.len() + encoded.len() > CMD_DIALOG_MAX_BYTES {
                    return Outcome::NoOp;
                }
                self.text.push_str(encoded);
                Outcome::Edited
            },
        }
    }

    /// Call after an `Enter`-driven [`Outcome::Close { submit: true }`]:
    /// runs `submit`, and reopens the dialog with its prior text if the
    /// callback returns `false` ("returning true from the callback
    /// closes the dialog" — implying `false` keeps it open for editing).
    pub fn submit(&mut self, submit: impl FnOnce(&str) -> bool) {
        if submit(&self.text) {
            self.text.clear();
        } else {
            self.open = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_closes_without_submit() {
        let mut d = CmdDialog::new();
        d.open();
        d.key(Key::Char('x'));
        assert_eq!(d.key(Key::Escape), Outcome::Close { submit: false });
        assert!(!d.is_open());
        assert_eq!(d.text(), "");
    }

    #[test]
    fn enter_closes_and_requests_submit() {
        let mut d = CmdDialog::new();
        d.open();
        d.key(Key::Char('l'));
        d.key(Key::Char('s'));
        assert_eq!(d.key(Key::Enter), Outcome::Close { submit: true });
        assert_eq!(d.text(), "ls");
    }

    #[test]
    fn backspace_removes_last_codepoint() {
        let mut d = CmdDialog::new();
        d.open();
        d.key(Key::Char('a'));
        d.key(Key::Char('é'));
        assert_eq!(d.key(Key::Backspace), Outcome::Edited);
        assert_eq!(d.text(), "a");
    }

    #[test]
    fn input_clamped_to_max_bytes() {
        let mut d = CmdDialog::new();
        d.open();
        for _ in 0..CMD_DIALOG_MAX_BYTES {
            d.key(Key::Char('x'));
        }
        assert_eq!(d.text().len(), CMD_DIALOG_MAX_BYTES);
        assert_eq!(d.key(Key::Char('y')), Outcome::NoOp);
        assert_eq!(d.text().len(), CMD_DIALOG_MAX_BYTES);
    }

    #[test]
    fn failed_submit_reopens_with_text_intact() {
        let mut d = CmdDialog::new();
        d.open();
        d.key(Key::Char('z'));
        assert_eq!(d.key(Key::Enter), Outcome::Close { submit: true });
        d.submit(|_| false);
        assert!(d.is_open());
        assert_eq!(d.text(), "z");
    }

    #[test]
    fn key_on_closed_dialog_is_noop() {
        let mut d = CmdDialog::new();
        assert_eq!(d.key(Key::Char('a')), Outcome::NoOp);
    }
}
