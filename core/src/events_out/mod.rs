pub mod record;
pub mod writer;

pub use crate::config::EventsOutConfig;
pub use record::DecisionRecord;
pub use writer::{start_events_out, EventsOutTx};
