//! Whole-dictionary comparison
//!
//! Compares every field of the current version against the previous one
//! and collects the results into a versioned report.

use dictlens_core::{ComparisonReport, Dictionary, FieldComparison, FileTypeComparison};
use crate::field_diff::{compare_field, find_field};

/// Compare a dictionary against its previous version
///
/// Without a previous version every file type and field is new.
pub fn compare_dictionaries(current: &Dictionary, previous: Option<&Dictionary>) -> ComparisonReport {
    let file_types: Vec<FileTypeComparison> = current
        .files
        .iter()
        .map(|file_type| {
            let previous_type = previous.and_then(|p| p.file_type(&file_type.name));

            let fields = file_type
                .fields
                .iter()
                .map(|field| FieldComparison {
                    name: field.name.clone(),
                    result: compare_field(
                        field,
                        previous.and_then(|p| find_field(p, &file_type.name, &field.name)),
                    ),
                })
                .collect();

            let removed_fields = previous_type
                .map(|p| {
                    p.fields
                        .iter()
                        .filter(|f| file_type.field(&f.name).is_none())
                        .map(|f| f.name.clone())
                        .collect()
                })
                .unwrap_or_default();

            FileTypeComparison {
                name: file_type.name.clone(),
                is_new: previous_type.is_none(),
                fields,
                removed_fields,
            }
        })
        .collect();

    let removed_file_types = previous
        .map(|p| {
            p.files
                .iter()
                .filter(|f| current.file_type(&f.name).is_none())
                .map(|f| f.name.clone())
                .collect()
        })
        .unwrap_or_default();

    let report = ComparisonReport::new(
        previous.map(|p| p.version.clone()),
        current.version.clone(),
        file_types,
        removed_file_types,
    )
    .with_fingerprints(
        previous.and_then(|p| p.fingerprint().ok()),
        current.fingerprint().ok(),
    );

    tracing::debug!(
        from = ?report.from_version,
        to = %report.to_version,
        new = report.summary.new_fields,
        changed = report.summary.changed_fields,
        "compared dictionaries"
    );

    report
}
