use thiserror::Error;

/// Result type alias for construct operations.
pub type Result<T> = std::result::Result<T, ConstructError>;

/// Errors raised while declaring resources in a stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructError {
    #[error("Construct id cannot be empty")]
    EmptyId,
    #[error("Invalid stack name '{0}' (expected a letter, then letters, digits or hyphens)")]
    InvalidStackName(String),
    #[error("Invalid construct id '{0}': must contain at least one alphanumeric character")]
    InvalidId(String),
    #[error("Duplicate construct id '{id}' in stack '{stack}'")]
    DuplicateId { stack: String, id: String },
    #[error("Partition key name cannot be empty")]
    EmptyKeyName,
    #[error("Invalid attribute type '{0}' (expected S, N or B)")]
    InvalidAttributeType(String),
    #[error("Invalid removal policy '{0}' (expected retain or destroy)")]
    InvalidRemovalPolicy(String),
    #[error("Unsupported runtime '{0}'")]
    InvalidRuntime(String),
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("Handler entry point cannot be empty")]
    EmptyEntryPoint,
    #[error("Resource '{path}' already has a {method} method")]
    DuplicateMethod { path: String, method: String },
    #[error("Resource '{parent}' already has a child '{path_part}'")]
    DuplicatePathPart { parent: String, path_part: String },
    #[error("Invalid path part '{0}'")]
    InvalidPathPart(String),
    #[error("Unknown API resource")]
    UnknownResource,
    #[error("Function '{0}' is not declared in this stack")]
    UnknownFunction(String),
    #[error("Table '{0}' is not declared in this stack")]
    UnknownTable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_id_display() {
        let error = ConstructError::DuplicateId {
            stack: "TripsStack".to_string(),
            id: "Trips".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Duplicate construct id 'Trips' in stack 'TripsStack'"
        );
    }

    #[test]
    fn test_invalid_stack_name_display() {
        let error = ConstructError::InvalidStackName("../x".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid stack name '../x' (expected a letter, then letters, digits or hyphens)"
        );
    }

    #[test]
    fn test_duplicate_method_display() {
        let error = ConstructError::DuplicateMethod {
            path: "/trips".to_string(),
            method: "GET".to_string(),
        };
        assert_eq!(error.to_string(), "Resource '/trips' already has a GET method");
    }

    #[test]
    fn test_invalid_removal_policy_display() {
        let error = ConstructError::InvalidRemovalPolicy("snapshot".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid removal policy 'snapshot' (expected retain or destroy)"
        );
    }
}
