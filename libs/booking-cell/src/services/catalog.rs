use chrono::NaiveDate;

/// The fixed grid of bookable time-of-day labels. Every calendar day offers
/// the same twelve half-hour slots across a morning and an afternoon block;
/// per-doctor and holiday calendars are an external extension point.
const SLOT_TIMES: [&str; 12] = [
    "9:00 AM",
    "9:30 AM",
    "10:00 AM",
    "10:30 AM",
    "11:00 AM",
    "11:30 AM",
    "2:00 PM",
    "2:30 PM",
    "3:00 PM",
    "3:30 PM",
    "4:00 PM",
    "4:30 PM",
];

pub struct SlotCatalog;

impl SlotCatalog {
    /// Ordered list of bookable labels for a day. Pure: no I/O, identical
    /// output for repeated calls with the same date.
    pub fn slots_for_day(_date: NaiveDate) -> &'static [&'static str] {
        &SLOT_TIMES
    }

    pub fn contains(date: NaiveDate, time: &str) -> bool {
        Self::slots_for_day(date).iter().any(|slot| *slot == time)
    }
}
