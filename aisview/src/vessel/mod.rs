mod dispatcher;
mod record;
mod table;

pub use dispatcher::{ChangeEvent, DispatchStats, Dispatcher, VesselReport};
pub use record::{merge, Field, Mmsi, PartialRecord, Value, VesselRecord};
pub use table::{TableError, Upsert, VesselTable};
