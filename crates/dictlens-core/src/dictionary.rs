//! Dictionary document model
//!
//! A dictionary is a versioned schema describing the file types a submitter
//! can upload, their fields, validation restrictions and the relations
//! between file types. Documents use the camelCase JSON layout served by
//! the submission server.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Kind of a field restriction, without its configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionKind {
    /// Value must be a code from a named code list
    Codelist,

    /// Value must match a regular expression
    Regex,

    /// Value must satisfy a script expression
    Script,

    /// Value must be present
    Required,
}

impl RestrictionKind {
    /// All kinds, in display order
    pub const ALL: [RestrictionKind; 4] = [
        RestrictionKind::Codelist,
        RestrictionKind::Regex,
        RestrictionKind::Script,
        RestrictionKind::Required,
    ];

    /// Stable lowercase identifier, as used in the `type` key of documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Codelist => "codelist",
            Self::Regex => "regex",
            Self::Script => "script",
            Self::Required => "required",
        }
    }
}

impl std::fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Examples attached to a regex restriction
///
/// Older dictionaries store them as one comma-separated string, newer ones
/// as a list. Two values are equal when they describe the same list, so a
/// missing value, `""` and `[]` are all the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegexExamples {
    List(Vec<String>),
    Text(String),
}

impl RegexExamples {
    /// Examples as a list, splitting the legacy string form on ", "
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            Self::Text(text) if text.is_empty() => Vec::new(),
            Self::Text(text) => text.split(", ").map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl Default for RegexExamples {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl PartialEq for RegexExamples {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl Eq for RegexExamples {}

fn default_true() -> bool {
    true
}

/// `null` reads as no examples
fn examples_or_empty<'de, D>(deserializer: D) -> Result<RegexExamples, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RegexExamples>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validation rule attached to a field
///
/// Serialized as `{"type": "<kind>", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum Restriction {
    /// Membership in a named code list
    Codelist { name: String },

    /// Regular expression the value must match
    Regex {
        pattern: String,
        #[serde(
            default,
            deserialize_with = "examples_or_empty",
            skip_serializing_if = "RegexExamples::is_empty"
        )]
        examples: RegexExamples,
    },

    /// Script expression evaluated against the record
    Script {
        script: String,
        #[serde(default)]
        description: String,
    },

    /// Required-ness of the value
    Required {
        #[serde(default = "default_true")]
        required: bool,
        #[serde(default, rename = "acceptMissingCode")]
        accept_missing_code: bool,
    },
}

impl Restriction {
    /// Create a code list restriction
    pub fn codelist(name: impl Into<String>) -> Self {
        Self::Codelist { name: name.into() }
    }

    /// Create a regex restriction without examples
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            examples: RegexExamples::default(),
        }
    }

    /// Create a script restriction
    pub fn script(script: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Script {
            script: script.into(),
            description: description.into(),
        }
    }

    /// Create a required restriction
    pub fn required(accept_missing_code: bool) -> Self {
        Self::Required {
            required: true,
            accept_missing_code,
        }
    }

    /// The kind of this restriction
    pub fn kind(&self) -> RestrictionKind {
        match self {
            Self::Codelist { .. } => RestrictionKind::Codelist,
            Self::Regex { .. } => RestrictionKind::Regex,
            Self::Script { .. } => RestrictionKind::Script,
            Self::Required { .. } => RestrictionKind::Required,
        }
    }

    /// Text fragments of the configuration, used for free-text search
    pub fn search_terms(&self) -> Vec<String> {
        match self {
            Self::Codelist { name } => vec![name.clone()],
            Self::Regex { pattern, examples } => {
                let mut terms = vec![pattern.clone()];
                terms.extend(examples.to_vec());
                terms
            }
            Self::Script {
                script,
                description,
            } => vec![script.clone(), description.clone()],
            Self::Required { .. } => vec!["required".to_string()],
        }
    }
}

/// A field (column) of a file type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name, unique within its file type
    pub name: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Value type (TEXT, INTEGER, DECIMAL, DATETIME, ...)
    pub value_type: String,

    /// Whether the field holds controlled-access data
    #[serde(default)]
    pub controlled: bool,

    /// Ordered restrictions
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
}

impl Field {
    /// Create a field with no label and no restrictions
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            value_type: value_type.into(),
            controlled: false,
            restrictions: Vec::new(),
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the controlled flag
    pub fn with_controlled(mut self, controlled: bool) -> Self {
        self.controlled = controlled;
        self
    }

    /// Append a restriction
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// First restriction of the given kind
    pub fn restriction(&self, kind: RestrictionKind) -> Option<&Restriction> {
        self.restrictions.iter().find(|r| r.kind() == kind)
    }

    /// All restrictions of the given kind, in document order
    pub fn restrictions_of(&self, kind: RestrictionKind) -> Vec<&Restriction> {
        self.restrictions.iter().filter(|r| r.kind() == kind).collect()
    }

    /// Name of the code list this field is restricted to, if any
    pub fn codelist_name(&self) -> Option<&str> {
        match self.restriction(RestrictionKind::Codelist) {
            Some(Restriction::Codelist { name }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether a value is required for this field
    pub fn is_required(&self) -> bool {
        matches!(
            self.restriction(RestrictionKind::Required),
            Some(Restriction::Required { required: true, .. })
        )
    }
}

/// A declared join between two file types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the related file type
    pub other: String,

    /// Join fields on the owning file type
    #[serde(default)]
    pub fields: Vec<String>,

    /// Join fields on the other file type
    #[serde(default)]
    pub other_fields: Vec<String>,
}

impl Relation {
    /// Create a relation to `other` joining `fields` to `other_fields`
    pub fn new<S: Into<String>>(
        other: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
        other_fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            other: other.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            other_fields: other_fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// How a relation edge maps onto the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// The owning file type is the parent of `other`
    #[default]
    Forward,

    /// `other` is the parent of the owning file type
    Reverse,
}

/// A named record type within a dictionary version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileType {
    /// Unique name (e.g. "donor")
    pub name: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Field names whose combination must be unique
    #[serde(default)]
    pub unique_fields: Vec<String>,

    /// Relations to other file types
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl FileType {
    /// Create an empty file type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            fields: Vec::new(),
            unique_fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_unique_fields<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.unique_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Find a field by exact name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in document order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// A versioned dictionary document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// Version identifier (e.g. "0.6c")
    pub version: String,

    /// Ordered file types
    #[serde(default)]
    pub files: Vec<FileType>,
}

impl Dictionary {
    /// Create a dictionary from file types
    pub fn new(version: impl Into<String>, files: Vec<FileType>) -> Self {
        Self {
            version: version.into(),
            files,
        }
    }

    /// Parse a dictionary from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a file type by exact name
    pub fn file_type(&self, name: &str) -> Option<&FileType> {
        self.files.iter().find(|f| f.name == name)
    }

    /// File type names in document order
    pub fn file_type_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// File types re-ordered by a display order
    ///
    /// Names absent from `order` follow all listed names, keeping their
    /// document order.
    pub fn sorted_file_types(&self, order: &[String]) -> Vec<&FileType> {
        let mut files: Vec<&FileType> = self.files.iter().collect();
        files.sort_by_key(|f| {
            order
                .iter()
                .position(|name| name == &f.name)
                .unwrap_or(usize::MAX)
        });
        files
    }

    /// SHA-256 of the JSON encoding, hex encoded
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// A single term of a code list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListTerm {
    pub code: String,
    pub value: String,
}

/// A named list of permitted codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeList {
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub terms: Vec<CodeListTerm>,
}

impl CodeList {
    /// Create a code list from `(code, value)` pairs
    pub fn new<S: Into<String>>(name: impl Into<String>, terms: impl IntoIterator<Item = (S, S)>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            terms: terms
                .into_iter()
                .map(|(code, value)| CodeListTerm {
                    code: code.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Value for a code, if the code is part of the list
    pub fn value_for(&self, code: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|t| t.code == code)
            .map(|t| t.value.as_str())
    }
}
