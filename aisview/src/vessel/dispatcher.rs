//! Update dispatcher
//!
//! Feeds incoming reports into a `VesselTable` and turns every successful
//! merge into a `ChangeEvent` for whoever renders the table. Messages that
//! don't identify a vessel are control traffic and are skipped.

use super::record::{Mmsi, PartialRecord};
use super::table::VesselTable;
use tracing::{debug, trace};

/// An inbound message that may carry a vessel report.
pub trait VesselReport {
    /// Identifier of the reporting vessel, or `None` for non-vessel messages.
    fn vessel_id(&self) -> Option<Mmsi>;

    /// The recognized fields carried by this message.
    fn partial_record(&self) -> PartialRecord;
}

/// Notification that the row at `row` was inserted (`is_new_row`) or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub row: usize,
    pub is_new_row: bool,
    pub mmsi: Mmsi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Every message handed to the dispatcher.
    pub messages: u64,
    /// Messages merged into the table.
    pub reports: u64,
    /// Messages without a vessel identifier.
    pub skipped: u64,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    table: VesselTable,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher::default()
    }

    pub fn table(&self) -> &VesselTable {
        &self.table
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn into_table(self) -> VesselTable {
        self.table
    }

    /// Processes a single message, returning the resulting change if it
    /// was a vessel report.
    pub fn dispatch<R: VesselReport + ?Sized>(&mut self, msg: &R) -> Option<ChangeEvent> {
        self.stats.messages += 1;
        let mmsi = match msg.vessel_id() {
            Some(mmsi) => mmsi,
            None => {
                self.stats.skipped += 1;
                return None;
            }
        };
        let upsert = self.table.upsert(mmsi, &msg.partial_record());
        self.stats.reports += 1;
        if upsert.is_new {
            debug!(%mmsi, row = upsert.row, vessels = self.table.row_count(), "new vessel");
        } else {
            trace!(%mmsi, row = upsert.row, "vessel updated");
        }
        Some(ChangeEvent {
            row: upsert.row,
            is_new_row: upsert.is_new,
            mmsi,
        })
    }

    /// Dispatches every message of `messages` until it is exhausted,
    /// calling `on_change` after each merge.
    pub fn run<I, F>(&mut self, messages: I, mut on_change: F)
    where
        I: IntoIterator,
        I::Item: VesselReport,
        F: FnMut(&VesselTable, ChangeEvent),
    {
        for msg in messages {
            if let Some(event) = self.dispatch(&msg) {
                on_change(&self.table, event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{Field, Value};

    struct Report(Option<u32>, Vec<(Field, Value)>);

    impl VesselReport for Report {
        fn vessel_id(&self) -> Option<Mmsi> {
            self.0.map(Mmsi)
        }

        fn partial_record(&self) -> PartialRecord {
            self.1.iter().cloned().collect()
        }
    }

    #[test]
    fn control_messages_are_skipped() {
        let mut dispatcher = Dispatcher::new();
        let ping = Report(None, vec![(Field::Name, Value::Text("ping".into()))]);
        assert_eq!(dispatcher.dispatch(&ping), None);
        assert_eq!(dispatcher.table().row_count(), 0);
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                messages: 1,
                reports: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn reports_produce_events() {
        let mut dispatcher = Dispatcher::new();
        let first = dispatcher.dispatch(&Report(Some(300), vec![]));
        assert_eq!(
            first,
            Some(ChangeEvent {
                row: 0,
                is_new_row: true,
                mmsi: Mmsi(300)
            })
        );
        let second = dispatcher.dispatch(&Report(Some(100), vec![]));
        assert_eq!(
            second,
            Some(ChangeEvent {
                row: 0,
                is_new_row: true,
                mmsi: Mmsi(100)
            })
        );
        let update = dispatcher.dispatch(&Report(
            Some(300),
            vec![(Field::Speed, Value::Float(3.5))],
        ));
        assert_eq!(
            update,
            Some(ChangeEvent {
                row: 1,
                is_new_row: false,
                mmsi: Mmsi(300)
            })
        );
        assert_eq!(
            dispatcher.table().get(Mmsi(300)).unwrap().get(Field::Speed),
            &Value::Float(3.5)
        );
    }

    #[test]
    fn run_drains_all_messages() {
        let messages = vec![
            Report(Some(2), vec![]),
            Report(None, vec![]),
            Report(Some(1), vec![]),
            Report(Some(2), vec![]),
        ];
        let mut events = Vec::new();
        let mut dispatcher = Dispatcher::new();
        dispatcher.run(messages, |table, event| {
            assert!(event.row < table.row_count());
            events.push((event.row, event.is_new_row));
        });
        assert_eq!(events, [(0, true), (0, true), (1, false)]);
        assert_eq!(dispatcher.stats().messages, 4);
        assert_eq!(dispatcher.stats().reports, 3);
        assert_eq!(dispatcher.into_table().row_count(), 2);
    }
}
