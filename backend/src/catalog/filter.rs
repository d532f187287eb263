//! Client-side search over the listed vehicles

use super::VehicleRecord;

/// Returns the records whose searchable fields contain `query`, ignoring case
///
/// The result keeps the input order. An empty query matches every record.
#[must_use]
pub fn filter_records<'a>(records: &'a [VehicleRecord], query: &str) -> Vec<&'a VehicleRecord> {
    let needle = query.to_lowercase();

    records
        .iter()
        .filter(|record| {
            record
                .searchable_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
