pub mod gpsd;
pub mod vessel;
pub mod view;

pub use vessel::{Dispatcher, VesselTable};
pub use view::{RefreshScheduler, ViewProjector, Viewport};
