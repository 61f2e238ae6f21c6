mod folders;
mod notes;
mod tags;

pub use folders::FolderService;
pub use notes::NoteService;
pub use tags::TagService;

use uuid::Uuid;

use crate::{error::ApiError, repository::StoreError};

/// Parses a path or body reference id.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::try_parse(raw).map_err(|_| ApiError::invalid_id())
}

/// Like [`parse_id`], with absent and empty values meaning "no reference".
pub fn parse_optional_id(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => parse_id(raw).map(Some),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(format!(
            "Missing `{field}` in request body"
        ))),
    }
}

fn search_term(term: Option<String>) -> Option<String> {
    term.filter(|term| !term.is_empty())
}

/// Maps the store's duplicate-key signal onto a client error.
fn conflict_as(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |e| match e {
        StoreError::Conflict(_) => ApiError::bad_request(message),
        other => ApiError::Internal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_rejected() {
        for raw in ["", "abc", "123", "5c4a998b1e2f3b0a9c8d7e6f", "not-a-uuid-at-all"] {
            let err = parse_id(raw).unwrap_err();
            assert_eq!(err.to_string(), crate::error::INVALID_ID);
        }
    }

    #[test]
    fn well_formed_ids_are_accepted() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert_eq!(parse_id(&id.simple().to_string()).unwrap(), id);
    }

    #[test]
    fn empty_optional_id_means_absent() {
        assert_eq!(parse_optional_id(None).unwrap(), None);
        assert_eq!(parse_optional_id(Some("")).unwrap(), None);
        assert!(parse_optional_id(Some("nope")).is_err());
    }

    #[test]
    fn empty_required_field_counts_as_missing() {
        let err = required(Some(String::new()), "name").unwrap_err();
        assert_eq!(err.to_string(), "Missing `name` in request body");
        assert_eq!(required(Some("x".to_string()), "name").unwrap(), "x");
    }

    #[test]
    fn only_conflicts_become_client_errors() {
        let err = conflict_as("taken")(StoreError::Conflict("k".to_string()));
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "taken"));

        let err = conflict_as("taken")(StoreError::Unavailable("down".to_string()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
