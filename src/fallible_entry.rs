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

//! `Entry::or_insert_with` has no fallible counterpart in std. Views and
//! surfaces are frequently created lazily on first touch from a handler
//! that itself returns `Result`, so we add one.

use std::collections::hash_map::Entry;
use std::hash::Hash;

pub trait FallibleEntryExt<'a, K, V> {
    fn or_insert_with_result<E>(
        self,
        default: impl FnOnce() -> Result<V, E>,
    ) -> Result<&'a mut V, E>;
}

impl<'a, K, V> FallibleEntryExt<'a, K, V> for Entry<'a, K, V>
where
    K: Eq + Hash,
{
    fn or_insert_with_result<E>(
        self,
        default: impl FnOnce() -> Result<V, E>,
    ) -> Result<&'a mut V, E> {
        match self {
            Entry::Occupied(o) => Ok(o.into_mut()),
            Entry::Vacant(v) => Ok(v.insert(default()?)),
        }
    }
}
