use crate::domain::model::{Parsed, RecordList};

/// The one place where "bare object when exactly one result, array otherwise"
/// is resolved. Missing input is an empty list, never an error.
pub fn to_list(parsed: Option<Parsed>) -> RecordList {
    match parsed {
        None => RecordList::empty(),
        Some(Parsed::Node(node)) => RecordList::singleton(node),
        Some(Parsed::List(list)) => list,
    }
}

impl From<Parsed> for RecordList {
    fn from(parsed: Parsed) -> Self {
        to_list(Some(parsed))
    }
}
