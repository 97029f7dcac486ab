use thiserror::Error;

/// Unified error type for the flowtree library
#[derive(Debug, Error)]
pub enum FlowError {
    /// A call that the node variant does not support, such as pushing an
    /// event onto a composite or appending a child to a leaf
    #[error("Usage error on {node}: {operation} - {message}")]
    Usage {
        node: String,
        operation: String,
        message: String,
    },

    /// An assembly call would exceed a configured limit
    #[error("Limit exceeded on {node}: {resource} (current: {current}, limit: {limit})")]
    LimitExceeded {
        node: String,
        resource: String,
        current: usize,
        limit: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Invalid declarative tree definition
    #[error("Invalid tree definition at {path}: {message}")]
    Definition { message: String, path: String },

    /// Action name missing from the registry
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Serialization errors
    #[error("Serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// IO errors
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl FlowError {
    /// Create a usage error for a variant-mismatched call
    pub fn usage<N: Into<String>, O: Into<String>, M: Into<String>>(
        node: N,
        operation: O,
        message: M,
    ) -> Self {
        Self::Usage {
            node: node.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a limit error
    pub fn limit_exceeded<N: Into<String>, R: Into<String>>(
        node: N,
        resource: R,
        current: usize,
        limit: usize,
    ) -> Self {
        Self::LimitExceeded {
            node: node.into(),
            resource: resource.into(),
            current,
            limit,
        }
    }

    /// Create a configuration error naming the offending field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a definition error at the given path
    pub fn definition<S: Into<String>, P: Into<String>>(message: S, path: P) -> Self {
        Self::Definition {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Create an IO error
    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "usage",
            Self::LimitExceeded { .. } => "limit",
            Self::Configuration { .. } => "configuration",
            Self::Definition { .. } => "definition",
            Self::UnknownAction(_) => "registry",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FlowError>;

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        Self::io("io_operation", err)
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("json", err)
    }
}

impl From<serde_yaml::Error> for FlowError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization("yaml", err)
    }
}
