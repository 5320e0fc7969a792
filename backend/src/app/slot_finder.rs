//! Free-slot search
//!
//! Walks a cursor through a time range and proposes every slot of the
//! requested length that does not overlap a busy interval.

use chrono::{DateTime, FixedOffset};

use super::SlotRequest;

type Instant = DateTime<FixedOffset>;

/// Find free `[start, end)` slots inside the request range.
///
/// When the candidate slot overlaps a busy interval the cursor jumps to the
/// end of that interval, otherwise the slot is kept. Either way the cursor
/// then advances by the increment. Busy intervals may be given in any order.
/// The walk stops at the end of the range or where the date-time overflows.
pub fn find_free_slots(request: &SlotRequest, busy: &[(Instant, Instant)]) -> Vec<(Instant, Instant)> {
    let mut busy = busy.to_vec();
    busy.sort_by_key(|(start, _)| *start);

    let duration = request.duration;
    let increment = request.increment;
    let mut cursor = request.range.start;
    let offset = cursor.timezone();
    let mut slots = Vec::new();

    while let Some(slot_end) = cursor.checked_add_signed(duration) {
        if slot_end > request.range.end {
            break;
        }

        let conflict = busy
            .iter()
            .find(|(busy_start, busy_end)| !(slot_end <= *busy_start || cursor >= *busy_end));

        match conflict {
            // Keep output in the caller's offset
            Some((_, busy_end)) => cursor = busy_end.with_timezone(&offset),
            None => slots.push((cursor, slot_end)),
        }

        match cursor.checked_add_signed(increment) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    slots
}
