//! Source error types.
//!
//! [`SourceError`] carries a semantic kind, the backend that produced it and
//! the resource (path or URI) involved, so callers can decide between failing,
//! falling back, or degrading to empty navigation.

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// Resource exists but its content cannot be understood.
    Malformed,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific cause.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Path or URI context (if applicable).
    pub resource: Option<String>,
    /// Backend identifier (e.g., "Fs", "Http", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            resource: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path or URI context.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error for a resource.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound).with_resource(resource)
    }

    /// Create a malformed-content error for a resource.
    #[must_use]
    pub fn malformed(resource: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed).with_resource(resource)
    }

    /// Whether the resource simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == SourceErrorKind::NotFound
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, resource: Option<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => SourceErrorKind::Timeout,
            std::io::ErrorKind::InvalidData => SourceErrorKind::Malformed,
            _ => SourceErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(r) = resource {
            error = error.with_resource(r);
        }
        error
    }

    /// Create a source error from an HTTP status code.
    #[must_use]
    pub fn http_status(status: u16, resource: impl Into<String>) -> Self {
        let kind = match status {
            404 | 410 => SourceErrorKind::NotFound,
            401 | 403 => SourceErrorKind::PermissionDenied,
            400 => SourceErrorKind::InvalidPath,
            408 | 504 => SourceErrorKind::Timeout,
            429 => SourceErrorKind::RateLimited,
            500..=599 => SourceErrorKind::Unavailable,
            _ => SourceErrorKind::Other,
        };
        Self::new(kind).with_resource(resource)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (resource: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::PermissionDenied => "Permission denied",
            SourceErrorKind::InvalidPath => "Invalid path",
            SourceErrorKind::Malformed => "Malformed content",
            SourceErrorKind::Unavailable => "Unavailable",
            SourceErrorKind::RateLimited => "Rate limited",
            SourceErrorKind::Timeout => "Timeout",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(resource) = &self.resource {
            write!(f, " (resource: {resource})")?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
