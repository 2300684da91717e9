//! Grouping of flat per-file rows into per-admission records.

use indexmap::IndexMap;

use crate::models::{AggregatedRecord, FileUploadRow, RecordKey};

/// Group rows by `(patient_id, admission_id)`.
///
/// Records come out in order of first appearance and each record's files keep input
/// order. The first row of a key sets the record-level fields; later rows only append
/// their file. No row is dropped, including rows without a file id or with blank keys.
pub fn aggregate<'a, I>(rows: I) -> Vec<AggregatedRecord>
where
    I: IntoIterator<Item = &'a FileUploadRow>,
{
    let mut grouped: IndexMap<RecordKey, AggregatedRecord> = IndexMap::new();

    for row in rows {
        grouped
            .entry(RecordKey::of(row))
            .or_insert_with(|| AggregatedRecord::from_first_row(row))
            .files
            .push(row.descriptor());
    }

    tracing::debug!(records = grouped.len(), "Aggregated upload rows");

    grouped.into_values().collect()
}
