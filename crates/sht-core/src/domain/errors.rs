use crate::numerics::quadrature::QuadratureError;

pub type ShtResult<T> = Result<T, ShtError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShtErrorKind {
    ConfigurationError,
    NotConfigured,
    ShapeMismatch,
    SizeMismatch,
    AliasingError,
    OutOfRange,
}

impl ShtErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "ConfigurationError",
            Self::NotConfigured => "NotConfigured",
            Self::ShapeMismatch => "ShapeMismatch",
            Self::SizeMismatch => "SizeMismatch",
            Self::AliasingError => "AliasingError",
            Self::OutOfRange => "OutOfRange",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ConfigurationError => 2,
            Self::NotConfigured => 3,
            Self::ShapeMismatch | Self::SizeMismatch => 4,
            Self::AliasingError => 5,
            Self::OutOfRange => 6,
        }
    }
}

impl std::fmt::Display for ShtErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Synchronous failures raised by transform construction, grid setup and
/// every spectral/spatial operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShtError {
    #[error("invalid configuration: {message}")]
    Configuration { message: String },
    #[error("no spatial grid has been configured; call set_grid first")]
    NotConfigured,
    #[error("spatial array '{field}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("spectral array '{field}' has length {actual}, expected {expected}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(
        "grid resolution too low for exact transforms: {axis} has {actual} samples, at least {required} required"
    )]
    Aliasing {
        axis: &'static str,
        actual: usize,
        required: usize,
    },
    #[error("coefficient (l={degree}, m={order}) is outside the truncation {limit}")]
    OutOfRange {
        degree: i64,
        order: i64,
        limit: String,
    },
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}

impl ShtError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ShtErrorKind {
        match self {
            Self::Configuration { .. } | Self::Quadrature(_) => ShtErrorKind::ConfigurationError,
            Self::NotConfigured => ShtErrorKind::NotConfigured,
            Self::ShapeMismatch { .. } => ShtErrorKind::ShapeMismatch,
            Self::SizeMismatch { .. } => ShtErrorKind::SizeMismatch,
            Self::Aliasing { .. } => ShtErrorKind::AliasingError,
            Self::OutOfRange { .. } => ShtErrorKind::OutOfRange,
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.kind(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::{ShtError, ShtErrorKind};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (ShtErrorKind::ConfigurationError, 2, "ConfigurationError"),
            (ShtErrorKind::NotConfigured, 3, "NotConfigured"),
            (ShtErrorKind::ShapeMismatch, 4, "ShapeMismatch"),
            (ShtErrorKind::SizeMismatch, 4, "SizeMismatch"),
            (ShtErrorKind::AliasingError, 5, "AliasingError"),
            (ShtErrorKind::OutOfRange, 6, "OutOfRange"),
        ];

        for (kind, exit_code, name) in cases {
            assert_eq!(kind.exit_code(), exit_code);
            assert_eq!(kind.as_str(), name);
        }
    }

    #[test]
    fn diagnostic_line_carries_kind_and_message() {
        let error = ShtError::Aliasing {
            axis: "nlat",
            actual: 2,
            required: 3,
        };

        assert_eq!(error.kind(), ShtErrorKind::AliasingError);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [AliasingError] grid resolution too low for exact transforms: nlat has 2 samples, at least 3 required"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 5");
    }

    #[test]
    fn configuration_helper_builds_configuration_variant() {
        let error = ShtError::configuration("mres must be >= 1");
        assert_eq!(error.kind(), ShtErrorKind::ConfigurationError);
        assert_eq!(error.to_string(), "invalid configuration: mres must be >= 1");
    }
}
