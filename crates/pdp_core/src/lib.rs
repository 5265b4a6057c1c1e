//! Harvester core: pure job state, pacing math and row records.
mod item;
mod pacing;
mod pushback;
mod row;

pub use item::{WorkItem, PDP_URL_TEMPLATE};
pub use pacing::PacingPlanner;
pub use pushback::{PushbackWindow, WINDOW_CAPACITY};
pub use row::{ProductFields, ResultRow, RowStatus};
