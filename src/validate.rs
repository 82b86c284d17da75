//! Field validation for create and full-update input.
//!
//! Violations are collected into one field -> messages map and surfaced as
//! a single aggregated failure, never per-field responses.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::db::{Category, NewComment, NewPost, VoteField};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_AUTHOR_CHARS: usize = 100;

/// Field name to human-readable error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Raw post fields as received in a request body. Missing fields stay
/// `None` so validation can distinguish absent from blank.
#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

/// Raw comment fields as received in a request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub content: Option<String>,
    pub author: Option<String>,
}

/// Validate post input for create or full update.
///
/// Omitted optional fields fall back to their declared defaults (author
/// empty, category Other), not to previously stored values. An invalid
/// category is rejected, never coerced to Other.
///
/// # Errors
///
/// Returns the aggregated field error map if any constraint is violated.
pub fn validate_post(input: &PostInput) -> Result<NewPost, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = required_text(
        &mut errors,
        "title",
        input.title.as_deref(),
        Some(MAX_TITLE_CHARS),
    );
    let content = required_text(&mut errors, "content", input.content.as_deref(), None);

    let author = match input.author.as_deref() {
        None => String::new(),
        Some(author) => {
            let author = author.trim();
            if author.chars().count() > MAX_AUTHOR_CHARS {
                push_error(&mut errors, "author", too_long_message(MAX_AUTHOR_CHARS));
            }
            author.to_string()
        }
    };

    let category = match input.category.as_deref() {
        None => Category::Other,
        Some(raw) => Category::parse(raw).unwrap_or_else(|| {
            push_error(
                &mut errors,
                "category",
                format!("\"{raw}\" is not a valid choice."),
            );
            Category::Other
        }),
    };

    if errors.is_empty() {
        Ok(NewPost {
            title,
            content,
            author,
            category,
        })
    } else {
        Err(errors)
    }
}

/// Validate comment input for create or full update. Both fields are
/// required; author is capped at 100 characters.
///
/// # Errors
///
/// Returns the aggregated field error map if any constraint is violated.
pub fn validate_comment(input: &CommentInput) -> Result<NewComment, FieldErrors> {
    let mut errors = FieldErrors::new();

    let content = required_text(&mut errors, "content", input.content.as_deref(), None);
    let author = required_text(
        &mut errors,
        "author",
        input.author.as_deref(),
        Some(MAX_AUTHOR_CHARS),
    );

    if errors.is_empty() {
        Ok(NewComment { content, author })
    } else {
        Err(errors)
    }
}

/// Interpret the `like` field of a vote request body.
///
/// Accepts JSON booleans and the case-insensitive strings `"true"` and
/// `"false"`. Everything else (missing, null, other types or strings) is
/// rejected without mutation.
///
/// # Errors
///
/// Returns the rejection message naming the field and accepted values.
pub fn parse_vote_flag(body: &Value) -> Result<VoteField, String> {
    match body.get("like") {
        Some(Value::Bool(true)) => Ok(VoteField::Likes),
        Some(Value::Bool(false)) => Ok(VoteField::Dislikes),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(VoteField::Likes),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(VoteField::Dislikes),
        _ => Err("`like` must be true or false.".to_string()),
    }
}

/// Validate a required text field: present, non-blank after trimming, and
/// within the optional character cap. Returns the trimmed value (empty on
/// failure, with the error recorded).
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: Option<usize>,
) -> String {
    match value {
        None => {
            push_error(errors, field, "This field is required.".to_string());
            String::new()
        }
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                push_error(errors, field, "This field may not be blank.".to_string());
                return String::new();
            }
            if let Some(max) = max_chars {
                if trimmed.chars().count() > max {
                    push_error(errors, field, too_long_message(max));
                }
            }
            trimmed.to_string()
        }
    }
}

fn too_long_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}
