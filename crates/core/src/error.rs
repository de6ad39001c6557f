use crate::types::DbId;

/// Domain input that could not be interpreted, such as an unknown enum
/// value on the command line.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Client-side rejection of a rule draft. Nothing is sent to the store
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleValidationError {
    #[error("Please complete all fields")]
    IncompleteFields,

    #[error("The 'to' value ({to}) must be greater than the 'from' value ({from})")]
    InvertedRange { from: f64, to: f64 },

    #[error("The 'from' value {from} already falls inside range {existing_from}..{existing_to} (rule {rule_id})")]
    OverlappingRange {
        from: f64,
        rule_id: DbId,
        existing_from: f64,
        existing_to: f64,
    },

    #[error("Select a group name, make, model and at least one year")]
    IncompleteGroupSelection,

    #[error("Select an existing group to append to")]
    MissingAppendTarget,

    #[error("Switch to append mode before selecting an existing group")]
    NotInAppendMode,

    #[error("Group rule {0} does not exist in this scope")]
    UnknownGroupRule(DbId),

    #[error("A group named '{0}' already exists in this scope")]
    DuplicateGroupName(String),

    #[error("{field} is read-only while appending to an existing group")]
    ReadOnlyInAppendMode { field: &'static str },

    #[error("Select at least one rule")]
    EmptySelection,

    #[error("Invalid payload: {0}")]
    Payload(String),
}
