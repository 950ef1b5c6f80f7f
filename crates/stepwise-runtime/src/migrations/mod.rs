mod migrator;
mod report;

pub use migrator::{Migrator, RoundTrip, RoundTripStage};
pub use report::{DiffReport, Snapshot, StatusReport};
