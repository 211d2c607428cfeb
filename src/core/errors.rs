use thiserror::Error;

/// Docker-specific errors raised by the engine adapter
#[derive(Error, Debug)]
pub enum DockerError {
    /// Connection errors
    #[error("Failed to connect to Docker: {0}")]
    Connection(String),

    /// Container errors
    #[error("Container error: {0}")]
    Container(String),

    /// Image errors
    #[error("Image error: {0}")]
    Image(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// Volume errors
    #[error("Volume error: {0}")]
    Volume(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Validation errors
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Error crossing the bridge boundary.
///
/// The bridge only ever reports a message; anything structured about the
/// failure has to be recovered with [`classify_failure`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BridgeError(pub String);

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> FailureKind {
        classify_failure(&self.0)
    }
}

impl From<DockerError> for BridgeError {
    fn from(err: DockerError) -> Self {
        BridgeError(err.to_string())
    }
}

impl From<String> for BridgeError {
    fn from(message: String) -> Self {
        BridgeError(message)
    }
}

impl From<&str> for BridgeError {
    fn from(message: &str) -> Self {
        BridgeError(message.to_string())
    }
}

/// Result type for bridge calls
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Failure classes recognised in bridge error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Runtime or backend unreachable
    Connectivity,
    Permission,
    /// Resource still referenced by something else
    InUse,
    /// Target already gone
    NotFound,
    /// Name already taken on create
    NameConflict,
    Other,
}

impl FailureKind {
    /// Remediation appended to the raw message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FailureKind::Connectivity => Some(
                "Docker does not appear to be reachable. Make sure the Docker daemon is running and try again.",
            ),
            FailureKind::Permission => Some(
                "Permission denied. Check that your user can access the Docker socket (for example by joining the docker group).",
            ),
            FailureKind::InUse => Some(
                "The resource is still in use. Stop or remove the containers using it first.",
            ),
            FailureKind::NotFound => Some(
                "The resource no longer exists. It may have been removed already; refresh the list.",
            ),
            FailureKind::NameConflict => {
                Some("That name is already taken. Choose a different name.")
            }
            FailureKind::Other => None,
        }
    }
}

// Ordered most specific first: "already in use" must not read as InUse, a
// permission failure on the socket must not read as Connectivity, and a
// missing socket file is a connectivity problem rather than NotFound.
const FAILURE_PATTERNS: &[(FailureKind, &[&str])] = &[
    (
        FailureKind::Permission,
        &["permission denied", "access denied", "operation not permitted", "eacces"],
    ),
    (
        FailureKind::NameConflict,
        &["already exists", "already in use", "name is taken"],
    ),
    (
        FailureKind::InUse,
        &[
            "in use",
            "is being used",
            "being used by",
            "has active endpoints",
            "referenced in multiple repositories",
            "image has dependent child images",
            "conflict: unable to",
            "unable to delete",
        ],
    ),
    (
        FailureKind::Connectivity,
        &[
            "cannot connect",
            "connection refused",
            "failed to connect",
            "socket",
            "is the docker daemon running",
            "error trying to connect",
            "timed out",
        ],
    ),
    (
        FailureKind::NotFound,
        &["not found", "no such"],
    ),
];

/// Classify a bridge error message by case-insensitive substring match
pub fn classify_failure(message: &str) -> FailureKind {
    let lowered = message.to_lowercase();
    FAILURE_PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(kind, _)| *kind)
        .unwrap_or(FailureKind::Other)
}

/// Raw message plus the matching remediation hint, if any
pub fn describe_failure(message: &str) -> String {
    match classify_failure(message).hint() {
        Some(hint) => format!("{}\n\n{}", message, hint),
        None => message.to_string(),
    }
}

/// A request refused locally before any bridge call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("'{name}' is a system network managed by Docker and cannot be removed")]
    SystemNetwork { name: String },

    #[error("A volume name is required")]
    EmptyVolumeName,

    #[error("Nothing is selected")]
    EmptySelection,

    #[error("{0} is already in progress")]
    Busy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classification_table() {
        let cases = [
            ("Error response from daemon: remove myvol: volume is in use - [abc]", FailureKind::InUse),
            ("conflict: unable to delete 1234 (cannot be forced) - image is being used by running container", FailureKind::InUse),
            ("error while removing network: network app_default has active endpoints", FailureKind::InUse),
            ("Got permission denied while trying to connect to the Docker daemon socket", FailureKind::Permission),
            ("Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?", FailureKind::Connectivity),
            ("error trying to connect: No such file or directory (os error 2)", FailureKind::Connectivity),
            ("Failed to connect to Docker: connection refused", FailureKind::Connectivity),
            ("No such container: abc123", FailureKind::NotFound),
            ("network foo not found", FailureKind::NotFound),
            ("volume name \"data\" already exists", FailureKind::NameConflict),
            ("Conflict. The container name \"/web\" is already in use", FailureKind::NameConflict),
            ("something odd happened", FailureKind::Other),
        ];

        for (message, expected) in cases {
            assert_eq!(classify_failure(message), expected, "message: {message}");
        }
    }

    #[test]
    fn test_describe_appends_hint() {
        let described = describe_failure("volume is in use");
        assert!(described.starts_with("volume is in use"));
        assert!(described.contains(FailureKind::InUse.hint().unwrap()));
    }

    #[test]
    fn test_describe_unrecognised_is_verbatim() {
        assert_eq!(describe_failure("weird failure"), "weird failure");
    }

    #[test]
    fn test_docker_error_converts_to_bridge() {
        let err: BridgeError = DockerError::Volume("Failed to remove data: in use".to_string()).into();
        assert_eq!(err.message(), "Volume error: Failed to remove data: in use");
        assert_eq!(err.kind(), FailureKind::InUse);
    }

    #[test]
    fn test_rejection_messages() {
        let rejection = Rejection::SystemNetwork {
            name: "bridge".to_string(),
        };
        assert!(rejection.to_string().contains("system network"));
    }
}
