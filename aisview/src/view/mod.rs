mod projector;
mod refresh;

pub use projector::{project, ViewProjector, Viewport};
pub use refresh::{RefreshScheduler, DEFAULT_REFRESH_INTERVAL};
