//! Booking pairing and day aggregation (spec.md §4.1).
//!
//! Grounded on the gap-walking shape of the teacher's
//! `timeline::gap::TimeGapDetector::find_gaps`: sort, then walk both
//! sides with a running cursor instead of a nested search.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Booking, BookingCategory, BookingType, Direction};
use crate::time::normalize_cross_midnight;

/// A bound (in, out) pair with its duration, in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPair {
    pub category: BookingCategory,
    pub in_booking_id: String,
    pub out_booking_id: String,
    pub in_time: u16,
    /// May exceed 1439 when the pair crosses midnight (spec.md §4.1).
    pub out_time_adjusted: i32,
    pub duration_minutes: i32,
    pub crossed_midnight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingWarning {
    CrossMidnight,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingResult {
    pub pairs: Vec<BookingPair>,
    pub unpaired_ins: Vec<String>,
    pub unpaired_outs: Vec<String>,
    pub warnings: Vec<PairingWarning>,
}

impl PairingResult {
    pub fn pairs_in(&self, category: BookingCategory) -> impl Iterator<Item = &BookingPair> {
        self.pairs.iter().filter(move |p| p.category == category)
    }

    /// Sum of pair durations in one category (spec.md §4.6 step 7).
    pub fn total_minutes(&self, category: BookingCategory) -> i32 {
        self.pairs_in(category).map(|p| p.duration_minutes).sum()
    }
}

struct Bucketed<'a> {
    booking: &'a Booking,
    time: u16,
}

/// Pair every booking for one `(employee, date)` into in/out durations,
/// independently per category (spec.md §4.1). `booking_types` must carry
/// an entry for every `booking.booking_type_id` referenced.
pub fn pair_bookings(
    bookings: &[Booking],
    booking_types: &HashMap<String, BookingType>,
) -> PairingResult {
    let mut result = PairingResult::default();

    for category in [BookingCategory::Work, BookingCategory::Break] {
        let mut ins: Vec<Bucketed<'_>> = Vec::new();
        let mut outs: Vec<Bucketed<'_>> = Vec::new();

        for booking in bookings {
            let Some(bt) = booking_types.get(&booking.booking_type_id) else { continue };
            if bt.category != category {
                continue;
            }
            let entry = Bucketed { booking, time: booking.effective_time() };
            match bt.direction {
                Direction::In => ins.push(entry),
                Direction::Out => outs.push(entry),
            }
        }

        let mut paired_in_ids = std::collections::HashSet::new();
        let mut paired_out_ids = std::collections::HashSet::new();

        // Explicit-link pass: bind in-events that name their out via pair_id.
        for in_entry in &ins {
            let Some(pair_id) = &in_entry.booking.pair_id else { continue };
            if paired_in_ids.contains(&in_entry.booking.id) {
                continue;
            }
            if let Some(out_entry) =
                outs.iter().find(|o| &o.booking.id == pair_id && !paired_out_ids.contains(&o.booking.id))
            {
                push_pair(&mut result, category, in_entry, out_entry);
                paired_in_ids.insert(in_entry.booking.id.clone());
                paired_out_ids.insert(out_entry.booking.id.clone());
            }
        }

        // Chronological pass over whatever remains, sorted ascending.
        let mut remaining_ins: Vec<&Bucketed<'_>> =
            ins.iter().filter(|e| !paired_in_ids.contains(&e.booking.id)).collect();
        let mut remaining_outs: Vec<&Bucketed<'_>> =
            outs.iter().filter(|e| !paired_out_ids.contains(&e.booking.id)).collect();
        remaining_ins.sort_by_key(|e| e.time);
        remaining_outs.sort_by_key(|e| e.time);

        let mut out_cursor = 0usize;
        for in_entry in &remaining_ins {
            while out_cursor < remaining_outs.len() && remaining_outs[out_cursor].time < in_entry.time
            {
                out_cursor += 1;
            }
            if out_cursor >= remaining_outs.len() {
                result.unpaired_ins.push(in_entry.booking.id.clone());
                continue;
            }
            let out_entry = remaining_outs[out_cursor];
            push_pair(&mut result, category, in_entry, out_entry);
            paired_in_ids.insert(in_entry.booking.id.clone());
            paired_out_ids.insert(out_entry.booking.id.clone());
            out_cursor += 1;
        }

        for out_entry in &remaining_outs {
            if !paired_out_ids.contains(&out_entry.booking.id) {
                result.unpaired_outs.push(out_entry.booking.id.clone());
            }
        }
    }

    result
}

fn push_pair(
    result: &mut PairingResult,
    category: BookingCategory,
    in_entry: &Bucketed<'_>,
    out_entry: &Bucketed<'_>,
) {
    let (out_adjusted, crossed) = normalize_cross_midnight(in_entry.time, out_entry.time);
    let duration = out_adjusted - in_entry.time as i32;
    if crossed {
        result.warnings.push(PairingWarning::CrossMidnight);
    }
    result.pairs.push(BookingPair {
        category,
        in_booking_id: in_entry.booking.id.clone(),
        out_booking_id: out_entry.booking.id.clone(),
        in_time: in_entry.time,
        out_time_adjusted: out_adjusted,
        duration_minutes: duration,
        crossed_midnight: crossed,
    });
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::BookingSource;

    fn booking_type(id: &str, direction: Direction, category: BookingCategory) -> BookingType {
        BookingType {
            id: id.into(),
            tenant_id: "t1".into(),
            direction,
            category,
            display_name: id.into(),
        }
    }

    fn booking(id: &str, booking_type_id: &str, minutes: u16, pair_id: Option<&str>) -> Booking {
        Booking {
            id: id.into(),
            tenant_id: "t1".into(),
            employee_id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            raw_time: minutes,
            edited_time: minutes,
            calculated_time: None,
            booking_type_id: booking_type_id.into(),
            pair_id: pair_id.map(String::from),
            source: BookingSource::Web,
            reason_code: None,
            is_auto_generated: false,
            original_booking_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn types() -> HashMap<String, BookingType> {
        let mut m = HashMap::new();
        m.insert("come".into(), booking_type("come", Direction::In, BookingCategory::Work));
        m.insert("go".into(), booking_type("go", Direction::Out, BookingCategory::Work));
        m.insert(
            "break_start".into(),
            booking_type("break_start", Direction::In, BookingCategory::Break),
        );
        m.insert("break_end".into(), booking_type("break_end", Direction::Out, BookingCategory::Break));
        m
    }

    #[test]
    fn simple_work_day_pairs() {
        let bookings = vec![booking("b1", "come", 480, None), booking("b2", "go", 1020, None)];
        let result = pair_bookings(&bookings, &types());
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.total_minutes(BookingCategory::Work), 540);
        assert!(result.unpaired_ins.is_empty());
        assert!(result.unpaired_outs.is_empty());
    }

    #[test]
    fn cross_midnight_pair_warns_and_adjusts() {
        let bookings = vec![booking("b1", "come", 1320, None), booking("b2", "go", 120, None)];
        let result = pair_bookings(&bookings, &types());
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].duration_minutes, 240);
        assert!(result.pairs[0].crossed_midnight);
        assert!(result.warnings.contains(&PairingWarning::CrossMidnight));
    }

    #[test]
    fn unpaired_in_without_matching_out() {
        let bookings = vec![booking("b1", "come", 480, None)];
        let result = pair_bookings(&bookings, &types());
        assert!(result.pairs.is_empty());
        assert_eq!(result.unpaired_ins, vec!["b1".to_string()]);
    }

    #[test]
    fn unpaired_out_without_preceding_in() {
        let bookings = vec![booking("b1", "go", 480, None)];
        let result = pair_bookings(&bookings, &types());
        assert!(result.pairs.is_empty());
        assert_eq!(result.unpaired_outs, vec!["b1".to_string()]);
    }

    #[test]
    fn explicit_link_pairs_regardless_of_order() {
        let bookings =
            vec![booking("out1", "go", 480, None), booking("in1", "come", 1020, Some("out1"))];
        let result = pair_bookings(&bookings, &types());
        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].in_booking_id, "in1");
        assert_eq!(result.pairs[0].out_booking_id, "out1");
    }

    #[test]
    fn categories_are_independent() {
        let bookings = vec![
            booking("b1", "come", 480, None),
            booking("b2", "go", 1020, None),
            booking("b3", "break_start", 720, None),
            booking("b4", "break_end", 750, None),
        ];
        let result = pair_bookings(&bookings, &types());
        assert_eq!(result.total_minutes(BookingCategory::Work), 540);
        assert_eq!(result.total_minutes(BookingCategory::Break), 30);
    }

    #[test]
    fn already_paired_bookings_do_not_change_gross_time() {
        let mut bookings = vec![booking("b1", "come", 480, None), booking("b2", "go", 1020, None)];
        let before = pair_bookings(&bookings, &types()).total_minutes(BookingCategory::Work);
        // Adding a second, self-contained, already-linked pair must not
        // alter the first pair's contribution.
        bookings.push(booking("b3", "come", 600, Some("b4")));
        bookings.push(booking("b4", "go", 660, None));
        let result = pair_bookings(&bookings, &types());
        assert_eq!(result.total_minutes(BookingCategory::Work), before + 60);
    }
}
