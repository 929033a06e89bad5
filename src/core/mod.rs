pub mod chart;
pub mod coerce;
pub mod events;
pub mod fields;
pub mod format;
pub mod parser;
pub mod session;

pub use crate::domain::model::{AttributeNode, ChartPoint, DisplayAmount, Parsed, RawPayload, RecordList};
pub use crate::domain::ports::{Fetcher, KeyValueStore};
pub use crate::utils::error::Result;
