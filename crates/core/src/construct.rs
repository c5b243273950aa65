//! Construct paths and logical id allocation.
//!
//! A construct path is the list of ids from the stack down to a resource,
//! e.g. `["GetTripsHandler", "ServiceRole", "Resource"]`. The logical id of
//! the rendered resource is derived from that path alone, which keeps ids
//! stable across synthesis runs.

use sha2::{Digest, Sha256};

use crate::error::{ConstructError, Result};

/// Path component naming the primary resource of a construct.
pub const RESOURCE: &str = "Resource";

/// Path component naming the implicit child of a construct (e.g. an API root).
pub const DEFAULT: &str = "Default";

const HASH_LEN: usize = 8;

/// Longest stack name CloudFormation accepts.
pub const MAX_STACK_NAME_LEN: usize = 128;

/// Validates a construct id.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ConstructError::EmptyId);
    }
    if !id.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ConstructError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Validates a stack name: `[A-Za-z][-A-Za-z0-9]*`, at most 128 characters.
///
/// The name doubles as the template file name, so anything else is rejected.
pub fn validate_stack_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        && name.len() <= MAX_STACK_NAME_LEN;
    if !valid {
        return Err(ConstructError::InvalidStackName(name.to_string()));
    }
    Ok(())
}

/// Derives the template logical id for a construct path.
///
/// Single-component paths are used verbatim (minus non-alphanumerics).
/// Deeper paths concatenate the human readable components, skipping
/// `Resource` and `Default`, and append an 8 character hash of the full
/// path so that sibling constructs never collide.
///
/// ```
/// use tripstack_core::construct::logical_id;
///
/// assert_eq!(logical_id(&["Endpoint"]), "Endpoint");
/// let id = logical_id(&["Trips", "Resource"]);
/// assert!(id.starts_with("Trips"));
/// assert_eq!(id.len(), "Trips".len() + 8);
/// ```
pub fn logical_id(path: &[&str]) -> String {
    if path.len() == 1 {
        return sanitize(path[0]);
    }

    let human: String = path
        .iter()
        .filter(|component| **component != RESOURCE && **component != DEFAULT)
        .map(|component| sanitize(component))
        .collect();

    format!("{}{}", human, path_hash(path))
}

/// Upper-case hex prefix of the SHA-256 of the joined path.
pub fn path_hash(path: &[&str]) -> String {
    short_hash(path.join("/").as_bytes())
}

/// Upper-case 8 character hex prefix of the SHA-256 of `bytes`.
pub fn short_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode_upper(&digest[..HASH_LEN / 2])
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_rejects_empty() {
        assert_eq!(validate_id(""), Err(ConstructError::EmptyId));
    }

    #[test]
    fn test_validate_id_rejects_punctuation_only() {
        assert_eq!(
            validate_id("{}"),
            Err(ConstructError::InvalidId("{}".to_string()))
        );
    }

    #[test]
    fn test_validate_id_accepts_path_parameter() {
        assert!(validate_id("{id}").is_ok());
    }

    #[test]
    fn test_stack_name_accepts_cloudformation_names() {
        assert!(validate_stack_name("TripsStack").is_ok());
        assert!(validate_stack_name("trips-stack-2").is_ok());
        assert!(validate_stack_name(&"a".repeat(MAX_STACK_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_stack_name_rejects_paths_and_empty() {
        let invalid = [
            "",
            "../escaped",
            "a/b",
            "1Trips",
            "-trips",
            "trips stack",
            "trips_stack",
        ];
        for name in invalid {
            assert_eq!(
                validate_stack_name(name),
                Err(ConstructError::InvalidStackName(name.to_string())),
                "{name:?} must be rejected"
            );
        }
        let too_long = "a".repeat(MAX_STACK_NAME_LEN + 1);
        assert!(validate_stack_name(&too_long).is_err());
    }

    #[test]
    fn test_single_component_is_verbatim() {
        assert_eq!(logical_id(&["tripsApi"]), "tripsApi");
    }

    #[test]
    fn test_resource_and_default_are_skipped() {
        let id = logical_id(&["tripsApi", "Default", "trips", "Resource"]);
        assert!(id.starts_with("tripsApitrips"));
        assert_eq!(id.len(), "tripsApitrips".len() + 8);
    }

    #[test]
    fn test_path_parameter_braces_are_stripped() {
        let id = logical_id(&["tripsApi", "Default", "trips", "{id}", "GET"]);
        assert!(id.starts_with("tripsApitripsidGET"));
    }

    #[test]
    fn test_hash_distinguishes_paths_with_same_human_part() {
        let a = logical_id(&["Trips", "Resource"]);
        let b = logical_id(&["Trips", "Default"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_logical_id_is_stable() {
        assert_eq!(
            logical_id(&["GetTripsHandler", "ServiceRole", "Resource"]),
            logical_id(&["GetTripsHandler", "ServiceRole", "Resource"])
        );
    }

    #[test]
    fn test_short_hash_is_upper_hex() {
        let hash = short_hash(b"TripsStack");
        assert_eq!(hash.len(), 8);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
