//! Fixed table layouts for the three CSV inputs.
//!
//! Column NAMES come verbatim from each CSV's header row; only the TYPES are
//! fixed, per position. The loader validates nothing beyond column counts.

/// SQLite storage class assigned to a column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

/// One table's fixed positional layout.
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
    pub table: &'static str,
    pub types: &'static [ColumnType],
}

use ColumnType::{Integer, Real, Text};

pub const DEMOGRAPHICS: TableLayout = TableLayout {
    table: "demographics",
    types: &[Integer, Real],
};

pub const RIDERS: TableLayout = TableLayout {
    table: "riders",
    types: &[Integer, Integer, Real],
};

pub const TRIPS: TableLayout = TableLayout {
    table: "trips",
    types: &[
        Integer, // trip id
        Integer, // booking user id
        Real,    // pickup latitude
        Real,    // pickup longitude
        Real,    // drop-off latitude
        Real,    // drop-off longitude
        Text,    // pickup address
        Text,    // drop-off address
        Text,    // raw timestamp
        Integer, // passenger count
        Text,    // date
        Integer, // hour
        Text,    // day of week
        Text,    // month
        Text,    // weekend flag
        Text,    // time-of-day bucket
        Integer, // large-group flag
    ],
};

/// Single-column indexes built after load, on the join/filter columns.
pub const INDEXES: &[(&str, &str, &str)] = &[
    ("idx_demographics_user_id", "demographics", "user_id"),
    ("idx_riders_user_id", "riders", "user_id"),
    ("idx_riders_trip_id", "riders", "trip_id"),
    ("idx_trips_booking_user_id", "trips", "booking_user_id"),
    ("idx_trips_date", "trips", "date"),
    ("idx_trips_hour", "trips", "hour"),
];
