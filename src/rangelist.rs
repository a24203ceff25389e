//! Parser for compact cluster index range lists, e.g. `"1,2,3-5"`.

use crate::error::{BadToken, RangeListError};
use std::collections::BTreeSet;

/// Parse a range-list string into the set of indices it denotes.
///
/// Grammar: comma-separated tokens; each token is a single non-negative
/// integer `N` or an inclusive range `N-M` with `N <= M`. Whitespace around
/// tokens is tolerated. An empty token between consecutive commas is an
/// error, as is a non-numeric token, a reversed range, or a missing bound.
///
/// Parsing does not stop at the first malformed token; every bad token is
/// collected into the returned [`RangeListError`].
///
/// An empty (or all-whitespace) input is valid and yields the empty set:
/// absence of a clusterlist means "no constraint", not an authoring error.
pub fn parse_range_list(input: &str) -> Result<BTreeSet<usize>, RangeListError> {
    let mut indices = BTreeSet::new();
    let mut bad_tokens = Vec::new();

    if input.trim().is_empty() {
        return Ok(indices);
    }

    let mut start = 0;
    for raw in input.split(',') {
        let token = raw.trim();
        let offset = start + (raw.len() - raw.trim_start().len());

        match parse_token(token) {
            Some((lo, hi)) => indices.extend(lo..=hi),
            None => bad_tokens.push(BadToken {
                text: token.to_string(),
                offset,
            }),
        }

        start += raw.len() + 1;
    }

    if bad_tokens.is_empty() {
        Ok(indices)
    } else {
        Err(RangeListError {
            input: input.to_string(),
            bad_tokens,
        })
    }
}

/// Parse one trimmed token into an inclusive `(lo, hi)` pair.
/// A single value `N` is the degenerate range `(N, N)`.
fn parse_token(token: &str) -> Option<(usize, usize)> {
    if token.is_empty() {
        return None;
    }
    match token.split_once('-') {
        Some((lo, hi)) => {
            let lo: usize = lo.trim().parse().ok()?;
            let hi: usize = hi.trim().parse().ok()?;
            if lo <= hi { Some((lo, hi)) } else { None }
        }
        None => {
            let n: usize = token.parse().ok()?;
            Some((n, n))
        }
    }
}
