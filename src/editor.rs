use crate::model::{PostContent, PostField};

/// Replace one field of a post, leaving the others untouched.
///
/// Edits come from the user and are not validated.
pub fn set_field(mut record: PostContent, field: PostField, value: impl Into<String>) -> PostContent {
    *record.get_mut(field) = value.into();
    record
}
