use super::{LzEntry, MAX_DISTANCE, MAX_LENGTH, MIN_LENGTH};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("Cannot search for matches in an empty buffer")]
    EmptyBuffer,
    #[error("Position {pos} is outside of the buffer (length {len})")]
    OutOfRange { pos: usize, len: usize },
}

/// Find the best back-reference for `src[pos..]` within the preceding window.
///
/// Longer matches win; among equally long ones the furthest back is chosen.
pub fn find_best_match(src: &[u8], pos: usize) -> Result<Option<LzEntry>, MatchError> {
    if src.is_empty() {
        return Err(MatchError::EmptyBuffer);
    }
    if pos >= src.len() {
        return Err(MatchError::OutOfRange {
            pos,
            len: src.len(),
        });
    }

    Ok(search(src, pos))
}

/// Unchecked variant for callers that already guarantee `pos < src.len()`.
pub(super) fn search(src: &[u8], pos: usize) -> Option<LzEntry> {
    debug_assert!(pos < src.len());

    let mut best: Option<LzEntry> = None;

    for start in pos.saturating_sub(MAX_DISTANCE)..pos {
        let length = common_run(src, start, pos);
        if length < MIN_LENGTH {
            continue;
        }

        let candidate = LzEntry {
            distance: (pos - start) as u8,
            length: length as u8,
        };

        let keep_current = best.is_some_and(|current| {
            (current.length, current.distance) >= (candidate.length, candidate.distance)
        });
        if !keep_current {
            best = Some(candidate);
        }
    }

    best
}

/// Length of the run shared by `src[start..]` and `src[pos..]`.
///
/// The run may continue past `pos`, which is what lets a short pattern repeat itself.
fn common_run(src: &[u8], mut start: usize, mut pos: usize) -> usize {
    let mut count = 0;

    while count < MAX_LENGTH && pos < src.len() && src[start] == src[pos] {
        start += 1;
        pos += 1;
        count += 1;
    }

    count
}
