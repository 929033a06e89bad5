use crate::domain::model::{ChartPoint, RecordList};

/// Map records to `{name, value}` pairs in the order received.
///
/// Values are the leading base-10 integer of `value_field`; missing,
/// non-numeric and negative values all become `0` so every point is usable as
/// bar geometry.
pub fn reduce(records: &RecordList, name_field: &str, value_field: &str) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|record| {
            let value = match record.integer(value_field) {
                Some(v) => u64::try_from(v).unwrap_or(0),
                None => {
                    tracing::debug!(
                        "Chart value '{}' not numeric for '{}', using 0",
                        value_field,
                        record.text(name_field)
                    );
                    0
                }
            };
            ChartPoint {
                name: record.text(name_field).to_string(),
                value,
            }
        })
        .collect()
}
