//! Pure recurrence expansion.
//!
//! # Responsibility
//! - Turn a template's rule and effective range, intersected with a query
//!   window, into ordered candidate occurrence start times.
//!
//! # Invariants
//! - No side effects and no storage access; deterministic for a given input.
//! - Output is strictly chronological and a given date contributes at most
//!   one candidate.
//! - Both the effective range and the query window are inclusive on both
//!   ends; an empty or inverted intersection yields an empty list, never an
//!   error.

use crate::model::occurrence::DateWindow;
use crate::model::template::{RecurrenceKind, RecurrenceTemplate};
use chrono::{Datelike, NaiveDateTime};

/// Expands a template over the intersection of its effective range and the
/// caller's query window.
///
/// # Contract
/// - Daily kind: every date in the clamped range yields one candidate at the
///   template's `time_start`.
/// - Weekly kind: only dates whose weekday is in the template's set.
/// - The template's tombstone state is not consulted here; callers decide
///   whether an inactive series should expand at all.
pub fn expand_candidates(template: &RecurrenceTemplate, window: DateWindow) -> Vec<NaiveDateTime> {
    let clamp_start = template.effective_start.max(window.start);
    let clamp_end = match template.effective_end {
        Some(effective_end) => effective_end.min(window.end),
        None => window.end,
    };

    if clamp_start > clamp_end {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut date = clamp_start;
    loop {
        let due = match template.kind {
            RecurrenceKind::Daily => true,
            RecurrenceKind::Weekly => template.weekdays.contains(date.weekday()),
        };
        if due {
            candidates.push(date.and_time(template.time_start));
        }

        if date >= clamp_end {
            break;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    candidates
}
