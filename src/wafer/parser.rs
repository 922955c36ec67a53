// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Parser for the `"<x>,<y>"` die coordinate wire format

use nom::{
    character::complete::{char, i32, space0},
    combinator::all_consuming,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};

use super::{Die, DieSet};

fn coordinate(input: &str) -> IResult<&str, i32> {
    delimited(space0, i32, space0).parse(input)
}

fn die_pair(input: &str) -> IResult<&str, Die> {
    let (input, (x, y)) = separated_pair(coordinate, char(','), coordinate).parse(input)?;
    Ok((input, Die::new(x, y)))
}

/// Parse one coordinate string. Both components must be integers that fit in `i32`.
pub fn parse_die(input: &str) -> Option<Die> {
    all_consuming(die_pair)
        .parse(input)
        .ok()
        .map(|(_, die)| die)
}

/// Result of parsing a device's coordinate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDies {
    pub dies: Vec<Die>,
    /// Raw strings that could not be parsed.
    pub rejected: Vec<String>,
}

impl ParsedDies {
    pub fn into_die_set(self) -> Option<DieSet> {
        DieSet::new(self.dies)
    }
}

/// Parse every coordinate string, skipping (and logging) malformed entries so that a
/// single corrupt die never blanks the whole map.
pub fn parse_dies<S: AsRef<str>>(coords: &[S]) -> ParsedDies {
    let mut parsed = ParsedDies::default();
    for raw in coords {
        let raw = raw.as_ref();
        match parse_die(raw) {
            Some(die) => parsed.dies.push(die),
            None => {
                log::warn!("Skipping malformed die coordinate {raw:?}");
                parsed.rejected.push(raw.to_string());
            }
        }
    }
    parsed
}
