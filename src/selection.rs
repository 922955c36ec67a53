// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Set of selected die identities

use std::collections::BTreeSet;

use crate::wafer::Die;

/// Selected dies, keyed by their `"x,y"` identity.
///
/// Ordered so that submission payloads are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    keys: BTreeSet<String>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `die`. Returns `true` if it is selected afterwards.
    pub fn toggle(&mut self, die: &Die) -> bool {
        let key = die.key();
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    /// Replace the selection with exactly `dies`.
    pub fn select_all<'a, I>(&mut self, dies: I)
    where
        I: IntoIterator<Item = &'a Die>,
    {
        self.keys = dies.into_iter().map(Die::key).collect();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_selected(&self, die: &Die) -> bool {
        self.keys.contains(&die.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Owned copy of the selected keys, in order.
    pub fn to_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }
}
