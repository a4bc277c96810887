//! Vessel table
//!
//! Ordered collection of vessel records, kept sorted by `Mmsi` at all
//! times so that row `i` of any view is the `i`-th smallest identifier.
//! Lookup is a binary search; only the first sighting of a vessel pays
//! for a positional insert. Records are never removed.

use super::record::{Field, Mmsi, PartialRecord, VesselRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("row {row} is out of range for {rows} rows")]
    IndexOutOfRange { row: usize, rows: usize },
}

/// Outcome of a `VesselTable::upsert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upsert {
    pub row: usize,
    pub is_new: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VesselTable {
    rows: Vec<(Mmsi, VesselRecord)>,
}

impl VesselTable {
    pub fn new() -> VesselTable {
        VesselTable::default()
    }

    /// Merges `incoming` into the record for `id`, creating the record
    /// (all fields absent) at its sorted position on first sighting.
    pub fn upsert(&mut self, id: Mmsi, incoming: &PartialRecord) -> Upsert {
        match self.rows.binary_search_by_key(&id, |(mmsi, _)| *mmsi) {
            Ok(row) => {
                self.rows[row].1.merge(incoming);
                Upsert { row, is_new: false }
            }
            Err(row) => {
                let mut record = VesselRecord::new();
                record.merge(incoming);
                self.rows.insert(row, (id, record));
                Upsert { row, is_new: true }
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record_at(&self, row: usize) -> Result<&VesselRecord, TableError> {
        self.rows
            .get(row)
            .map(|(_, record)| record)
            .ok_or(TableError::IndexOutOfRange {
                row,
                rows: self.rows.len(),
            })
    }

    pub fn mmsi_at(&self, row: usize) -> Result<Mmsi, TableError> {
        self.rows
            .get(row)
            .map(|(mmsi, _)| *mmsi)
            .ok_or(TableError::IndexOutOfRange {
                row,
                rows: self.rows.len(),
            })
    }

    /// Current row of `id`, if it has been seen.
    pub fn position(&self, id: Mmsi) -> Option<usize> {
        self.rows.binary_search_by_key(&id, |(mmsi, _)| *mmsi).ok()
    }

    pub fn get(&self, id: Mmsi) -> Option<&VesselRecord> {
        self.position(id).map(|row| &self.rows[row].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mmsi, &VesselRecord)> {
        self.rows.iter().map(|(mmsi, record)| (*mmsi, record))
    }

    /// Column names, in display order.
    pub fn header() -> [&'static str; Field::COUNT] {
        Field::ALL.map(Field::name)
    }
}
