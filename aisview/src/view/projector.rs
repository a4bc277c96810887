//! View projector
//!
//! Keeps one row of display strings per vessel, in table order, and
//! decides after each change whether the screen needs to be redrawn.
//! The projector knows nothing about the terminal: the rendering side
//! only has to report which rows are currently visible.

use crate::vessel::{ChangeEvent, Field, TableError, VesselRecord, VesselTable};
use std::ops::Range;

/// Capability of a rendering surface to report which rows are on screen.
pub trait Viewport {
    fn visible_rows(&self) -> Range<usize>;
}

impl Viewport for Range<usize> {
    fn visible_rows(&self) -> Range<usize> {
        self.clone()
    }
}

/// Formats a record as one display string per recognized field.
pub fn project(record: &VesselRecord) -> Vec<String> {
    record.iter().map(|(_, value)| value.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct ViewProjector {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for ViewProjector {
    fn default() -> Self {
        ViewProjector::new()
    }
}

impl ViewProjector {
    pub fn new() -> ViewProjector {
        ViewProjector {
            header: Field::ALL.iter().map(|f| f.name().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Projects every row of `table` at once.
    pub fn from_table(table: &VesselTable) -> ViewProjector {
        let mut projector = ViewProjector::new();
        projector.rows = table.iter().map(|(_, record)| project(record)).collect();
        projector
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Applies `event` and returns whether a redraw is needed. Inserted
    /// rows always need one; updated rows only when they are visible.
    pub fn apply<V: Viewport + ?Sized>(
        &mut self,
        table: &VesselTable,
        event: ChangeEvent,
        viewport: &V,
    ) -> Result<bool, TableError> {
        let cells = project(table.record_at(event.row)?);
        let out_of_range = TableError::IndexOutOfRange {
            row: event.row,
            rows: self.rows.len(),
        };
        if event.is_new_row {
            if event.row > self.rows.len() {
                return Err(out_of_range);
            }
            self.rows.insert(event.row, cells);
            Ok(true)
        } else {
            match self.rows.get_mut(event.row) {
                Some(row) => *row = cells,
                None => return Err(out_of_range),
            }
            Ok(viewport.visible_rows().contains(&event.row))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{Dispatcher, Mmsi, PartialRecord, Value, VesselReport};

    struct Report(u32, Vec<(Field, Value)>);

    impl VesselReport for Report {
        fn vessel_id(&self) -> Option<Mmsi> {
            Some(Mmsi(self.0))
        }

        fn partial_record(&self) -> PartialRecord {
            let mut record: PartialRecord = self.1.iter().cloned().collect();
            record.insert(Field::Mmsi, Value::Int(self.0.into()));
            record
        }
    }

    fn feed(
        dispatcher: &mut Dispatcher,
        projector: &mut ViewProjector,
        report: Report,
        viewport: Range<usize>,
    ) -> bool {
        let event = dispatcher.dispatch(&report).unwrap();
        projector
            .apply(dispatcher.table(), event, &viewport)
            .unwrap()
    }

    #[test]
    fn rows_match_fixed_columns() {
        let mut dispatcher = Dispatcher::new();
        let mut projector = ViewProjector::new();
        feed(
            &mut dispatcher,
            &mut projector,
            Report(
                205024000,
                vec![
                    (Field::Lat, Value::Float(51.9)),
                    (Field::Callsign, Value::Text("ABCD".into())),
                ],
            ),
            0..10,
        );
        assert_eq!(projector.header().len(), Field::COUNT);
        assert_eq!(projector.header()[0], "mmsi");
        assert_eq!(
            projector.row(0).unwrap(),
            [
                "205024000", "None", "51.9", "None", "None", "None", "None", "ABCD", "None",
                "None", "None"
            ]
        );
    }

    #[test]
    fn inserts_always_redraw() {
        let mut dispatcher = Dispatcher::new();
        let mut projector = ViewProjector::new();
        assert!(feed(&mut dispatcher, &mut projector, Report(300, vec![]), 0..0));
        assert!(feed(&mut dispatcher, &mut projector, Report(100, vec![]), 0..0));
        assert_eq!(projector.row(0).unwrap()[0], "100");
        assert_eq!(projector.row(1).unwrap()[0], "300");
    }

    #[test]
    fn updates_redraw_only_when_visible() {
        let mut dispatcher = Dispatcher::new();
        let mut projector = ViewProjector::new();
        for id in 1..=20 {
            feed(&mut dispatcher, &mut projector, Report(id, vec![]), 0..5);
        }
        let speed = vec![(Field::Speed, Value::Float(7.0))];
        assert!(feed(&mut dispatcher, &mut projector, Report(3, speed.clone()), 0..5));
        assert!(!feed(&mut dispatcher, &mut projector, Report(15, speed.clone()), 0..5));
        assert!(feed(&mut dispatcher, &mut projector, Report(15, speed), 10..16));
        // Off-screen rows are still kept current.
        assert_eq!(projector.row(14).unwrap()[Field::Speed as usize], "7.0");
    }

    #[test]
    fn desynchronized_events_fail() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(&Report(1, vec![]));
        dispatcher.dispatch(&Report(2, vec![]));
        let mut projector = ViewProjector::new();
        let update = ChangeEvent {
            row: 1,
            is_new_row: false,
            mmsi: Mmsi(2),
        };
        assert_eq!(
            projector.apply(dispatcher.table(), update, &(0..10)),
            Err(TableError::IndexOutOfRange { row: 1, rows: 0 })
        );
        let insert = ChangeEvent {
            row: 5,
            is_new_row: true,
            mmsi: Mmsi(9),
        };
        assert_eq!(
            projector.apply(dispatcher.table(), insert, &(0..10)),
            Err(TableError::IndexOutOfRange { row: 5, rows: 2 })
        );
    }

    #[test]
    fn from_table_projects_everything() {
        let mut dispatcher = Dispatcher::new();
        for id in [5, 1, 3] {
            dispatcher.dispatch(&Report(id, vec![]));
        }
        let projector = ViewProjector::from_table(dispatcher.table());
        let first: Vec<&str> = projector.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(first, ["1", "3", "5"]);
    }
}
