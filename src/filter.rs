// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

/// Case-insensitive match where every whitespace-separated token of `query` must
/// appear somewhere in `candidate`. An empty query matches everything.
pub fn matches_query(candidate: &str, query: &str) -> bool {
    let haystack = candidate.to_lowercase();
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|token| haystack.contains(&token))
}

/// Items of `items` that match `query`, in their original order.
pub fn filter_items<'a, S: AsRef<str>>(items: &'a [S], query: &str) -> Vec<&'a str> {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| matches_query(item, query))
        .collect()
}
