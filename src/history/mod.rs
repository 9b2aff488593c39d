mod record;
mod stats;
mod store;

pub use record::{HistoryRecord, COLUMNS};
pub use stats::{summarize, Statistics};
pub use store::{PersistenceError, PredictionStore};
