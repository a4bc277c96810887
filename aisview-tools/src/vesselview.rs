//! State behind the vessel screen.
//!
//! Bundles the dispatcher with its projector and the list's scroll state,
//! and applies each result coming off the gpsd port to all three in step.

use crate::error::ViewerError;
use crate::listview::ListState;
use aisview::gpsd::{Message, RecvError};
use aisview::vessel::{Dispatcher, Mmsi};
use aisview::view::ViewProjector;
use chrono::{DateTime, Local};
use tracing::warn;

pub struct VesselView {
    dispatcher: Dispatcher,
    projector: ViewProjector,
    list: ListState,
    last_report: Option<DateTime<Local>>,
}

impl VesselView {
    /// An empty view showing `height` rows at a time.
    pub fn new(height: usize) -> VesselView {
        VesselView {
            dispatcher: Dispatcher::new(),
            projector: ViewProjector::new(),
            list: ListState::new(height),
            last_report: None,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn projector(&self) -> &ViewProjector {
        &self.projector
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState {
        &mut self.list
    }

    /// Local time of the last merged vessel report.
    pub fn last_report(&self) -> Option<DateTime<Local>> {
        self.last_report
    }

    /// The vessel under the cursor.
    pub fn focused(&self) -> Option<Mmsi> {
        self.dispatcher.table().mmsi_at(self.list.focus()).ok()
    }

    /// Applies one result from the port and returns whether the screen
    /// needs a redraw. Undecodable lines are skipped; a closed or failed
    /// connection ends the view.
    pub fn handle_message(&mut self, rxdata: Result<Message, RecvError>) -> Result<bool, ViewerError> {
        match rxdata {
            Ok(msg) => {
                let event = match self.dispatcher.dispatch(&msg) {
                    Some(event) => event,
                    None => return Ok(false),
                };
                self.last_report = Some(Local::now());
                // The list has to know about the new row before visibility is checked.
                if event.is_new_row {
                    self.list.on_insert(event.row);
                }
                Ok(self
                    .projector
                    .apply(self.dispatcher.table(), event, &self.list)?)
            }
            Err(RecvError::Protocol(e)) => {
                warn!(error = %e, "skipping undecodable line");
                Ok(false)
            }
            Err(RecvError::NotReady) => Ok(false),
            Err(e) => Err(ViewerError::Disconnected(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisview::gpsd::proto;
    use aisview::Viewport;
    use std::io;

    fn report(mmsi: u32, extra: &str) -> Result<Message, RecvError> {
        let line = format!(r#"{{"class":"AIS","mmsi":{}{}}}"#, mmsi, extra);
        Ok(Message::parse(line.as_bytes()).unwrap().unwrap())
    }

    fn filled(height: usize, ids: impl IntoIterator<Item = u32>) -> VesselView {
        let mut view = VesselView::new(height);
        for id in ids {
            assert!(view.handle_message(report(id, "")).unwrap());
        }
        view
    }

    #[test]
    fn port_errors() {
        let mut view = VesselView::new(10);
        let undecodable = RecvError::Protocol(proto::Error::LineTooLong(proto::MAX_LINE_SIZE));
        assert!(!view.handle_message(Err(undecodable)).unwrap());
        assert!(!view.handle_message(Err(RecvError::NotReady)).unwrap());
        assert!(matches!(
            view.handle_message(Err(RecvError::Disconnected)),
            Err(ViewerError::Disconnected(_))
        ));
        let reset = RecvError::IO(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(
            view.handle_message(Err(reset)),
            Err(ViewerError::Disconnected(_))
        ));
        assert_eq!(view.dispatcher().table().row_count(), 0);
        assert_eq!(view.last_report(), None);
    }

    #[test]
    fn control_messages_leave_screen_alone() {
        let mut view = filled(10, [1]);
        let version = Message::parse(br#"{"class":"VERSION","release":"3.25"}"#)
            .unwrap()
            .unwrap();
        assert!(!view.handle_message(Ok(version)).unwrap());
        assert_eq!(view.dispatcher().stats().skipped, 1);
    }

    #[test]
    fn offscreen_update_needs_no_redraw() {
        let mut view = filled(3, 1..=10);
        assert_eq!(view.list().visible_rows(), 0..3);
        assert!(!view.handle_message(report(10, r#","speed":4.5"#)).unwrap());
        assert!(view.handle_message(report(2, r#","speed":4.5"#)).unwrap());
        // The hidden row is current once it scrolls into view.
        assert_eq!(view.projector().row(9).unwrap()[6], "4.5");
        assert!(view.last_report().is_some());
    }

    #[test]
    fn insert_above_keeps_focus() {
        let mut view = filled(3, (1..=10).map(|i| i * 10));
        view.list_mut().down(7);
        assert_eq!(view.focused(), Some(Mmsi(80)));
        let before = view.list().visible_rows();

        assert!(view.handle_message(report(5, "")).unwrap());
        assert_eq!(view.focused(), Some(Mmsi(80)));
        assert_eq!(view.list().visible_rows(), before.start + 1..before.end + 1);
        assert_eq!(view.projector().row_count(), 11);
        assert_eq!(view.projector().row(0).unwrap()[0], "5");
    }
}
