//! Field diff engine for comparing a field against its previous version

use dictlens_core::{DiffResult, Dictionary, Field, FieldAttribute, RestrictionKind};

/// Look up a field by file type and field name
///
/// Returns `None` when either the file type or the field does not exist in
/// this version. Callers treat that as "the field is new", not as a fault.
pub fn find_field<'a>(dictionary: &'a Dictionary, file_type: &str, field: &str) -> Option<&'a Field> {
    dictionary.file_type(file_type)?.field(field)
}

/// Compare a field against its previous version
///
/// - No previous version: `New`
/// - Label, value type, controlled flag or any restriction kind differs: `Changed`
/// - Otherwise: `Unchanged`
pub fn compare_field(current: &Field, previous: Option<&Field>) -> DiffResult {
    let Some(previous) = previous else {
        return DiffResult::new_field();
    };

    let mut diffs = Vec::new();

    if current.label != previous.label {
        diffs.push(FieldAttribute::Label);
    }

    if current.value_type != previous.value_type {
        diffs.push(FieldAttribute::ValueType);
    }

    if current.controlled != previous.controlled {
        diffs.push(FieldAttribute::Controlled);
    }

    diffs.extend(
        restriction_diffs(current, previous)
            .into_iter()
            .map(FieldAttribute::Restriction),
    );

    DiffResult::from_diffs(diffs)
}

/// Restriction kinds whose restrictions differ between two fields
///
/// Restrictions are compared per kind: a kind differs when it is present on
/// one side only, or when any of its configuration values differ.
fn restriction_diffs(current: &Field, previous: &Field) -> Vec<RestrictionKind> {
    RestrictionKind::ALL
        .into_iter()
        .filter(|&kind| current.restrictions_of(kind) != previous.restrictions_of(kind))
        .collect()
}
