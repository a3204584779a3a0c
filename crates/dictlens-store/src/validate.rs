//! Structural validation run when a dictionary is loaded

use dictlens_core::{Dictionary, IssueCode, ValidationIssue};
use std::collections::HashSet;

/// Check a dictionary's structural invariants
///
/// Errors: duplicate file type or field names, relations to missing file
/// types, relations with mismatched join arity. Warnings: unique fields or
/// join fields that are not declared on their file type.
pub fn validate(dictionary: &Dictionary) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut seen_types = HashSet::new();
    for file_type in &dictionary.files {
        if !seen_types.insert(file_type.name.as_str()) {
            issues.push(
                ValidationIssue::new(
                    IssueCode::DuplicateFileType,
                    format!("File type '{}' is declared more than once", file_type.name),
                )
                .in_file_type(&file_type.name),
            );
        }
    }

    for file_type in &dictionary.files {
        let mut seen_fields = HashSet::new();
        for field in &file_type.fields {
            if !seen_fields.insert(field.name.as_str()) {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::DuplicateField,
                        format!("Field '{}' is declared more than once in '{}'", field.name, file_type.name),
                    )
                    .in_file_type(&file_type.name)
                    .on_field(&field.name),
                );
            }
        }

        for unique in &file_type.unique_fields {
            if file_type.field(unique).is_none() {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::UnknownUniqueField,
                        format!("Unique field '{}' is not a field of '{}'", unique, file_type.name),
                    )
                    .in_file_type(&file_type.name)
                    .on_field(unique),
                );
            }
        }

        for relation in &file_type.relations {
            if relation.fields.len() != relation.other_fields.len() {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::RelationArityMismatch,
                        format!(
                            "Relation '{}' -> '{}' joins {} field(s) to {}",
                            file_type.name,
                            relation.other,
                            relation.fields.len(),
                            relation.other_fields.len()
                        ),
                    )
                    .in_file_type(&file_type.name),
                );
            }

            for name in &relation.fields {
                if file_type.field(name).is_none() {
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::UnknownRelationField,
                            format!("Join field '{}' is not a field of '{}'", name, file_type.name),
                        )
                        .in_file_type(&file_type.name)
                        .on_field(name),
                    );
                }
            }

            let Some(other) = dictionary.file_type(&relation.other) else {
                issues.push(
                    ValidationIssue::new(
                        IssueCode::UnresolvedRelation,
                        format!(
                            "Relation '{}' -> '{}' points at a missing file type",
                            file_type.name, relation.other
                        ),
                    )
                    .in_file_type(&file_type.name),
                );
                continue;
            };

            for name in &relation.other_fields {
                if other.field(name).is_none() {
                    issues.push(
                        ValidationIssue::new(
                            IssueCode::UnknownRelationField,
                            format!("Join field '{}' is not a field of '{}'", name, other.name),
                        )
                        .in_file_type(&other.name)
                        .on_field(name),
                    );
                }
            }
        }
    }

    issues
}
