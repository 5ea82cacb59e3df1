//! Error taxonomy for generation, validation and persistence

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main error type for all generation operations
#[derive(Debug)]
pub enum GenerationError {
    /// No valid seed or growth path was found for a vine
    Placement {
        /// Vine that could not be placed
        vine_id: String,
        /// Description of what was tried
        reason: String,
    },

    /// A blocking cycle survived repair
    CircularBlocking {
        /// Each surviving cycle as an ordered list of vine ids
        chains: Vec<Vec<String>>,
    },

    /// Target coverage could not be reached even after gap filling
    CoverageInsufficient {
        /// Fraction of cells covered
        achieved: f64,
        /// Fraction that was required
        required: f64,
    },

    /// No clearing order exists for the vine set
    Unsolvable {
        /// Vines left when clearing got stuck
        remaining: usize,
        /// Check that reached the verdict
        method: &'static str,
    },

    /// Blocking depth exceeds the tier limit while strict depth is enforced
    DepthExceeded {
        /// Longest blocking chain found
        depth: usize,
        /// Tier limit
        limit: usize,
    },

    /// The exhaustive search hit its state cap before reaching a verdict
    SearchBudgetExhausted {
        /// Configured cap
        max_states: usize,
        /// States visited before stopping
        states_explored: usize,
    },

    /// A circuit breaker tripped
    Timeout {
        /// Time spent when the breaker tripped
        elapsed: Duration,
        /// Limit that was exceeded
        limit: Duration,
        /// Whether the hard breaker tripped
        hard: bool,
        /// Failure dump written for diagnosis
        dump: Option<PathBuf>,
    },

    /// Writing or reading a file failed
    Persistence {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A level or dump file could not be encoded or decoded
    Serialization {
        /// Path involved in the operation
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A vine violates a structural invariant
    InvalidVine {
        /// Offending vine
        vine_id: String,
        /// Violated invariant
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A placement strategy name is not registered
    UnknownStrategy {
        /// Requested name
        name: String,
        /// Registered names
        available: Vec<String>,
    },

    /// Every attempt failed
    AttemptsExhausted {
        /// Level that could not be generated
        level_id: u32,
        /// Attempts made
        attempts: usize,
        /// Failure dump written for diagnosis
        dump: Option<PathBuf>,
        /// Failure of the final attempt
        last: Option<Box<GenerationError>>,
    },

    /// One or more level files failed validation
    ValidationFailed {
        /// Files that failed
        failed: usize,
        /// Files checked
        total: usize,
    },
}

impl GenerationError {
    /// Short stable name used for failure statistics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Placement { .. } => "placement",
            Self::CircularBlocking { .. } => "circular_blocking",
            Self::CoverageInsufficient { .. } => "coverage",
            Self::Unsolvable { .. } => "unsolvable",
            Self::DepthExceeded { .. } => "depth",
            Self::SearchBudgetExhausted { .. } => "search_budget",
            Self::Timeout { .. } => "timeout",
            Self::Persistence { .. } | Self::Serialization { .. } => "persistence",
            Self::InvalidVine { .. } => "invalid_vine",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::UnknownStrategy { .. } => "unknown_strategy",
            Self::AttemptsExhausted { .. } => "exhausted",
            Self::ValidationFailed { .. } => "validation",
        }
    }

    /// Test whether another attempt with a fresh seed may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Placement { .. }
                | Self::CircularBlocking { .. }
                | Self::CoverageInsufficient { .. }
                | Self::Unsolvable { .. }
                | Self::DepthExceeded { .. }
                | Self::SearchBudgetExhausted { .. }
                | Self::InvalidVine { .. }
        )
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placement { vine_id, reason } => {
                write!(f, "Could not place vine {vine_id}: {reason}")
            }
            Self::CircularBlocking { chains } => {
                let rendered: Vec<String> = chains.iter().map(|chain| chain.join(" -> ")).collect();
                write!(
                    f,
                    "Circular blocking survived repair: {}",
                    rendered.join("; ")
                )
            }
            Self::CoverageInsufficient { achieved, required } => {
                write!(
                    f,
                    "Insufficient coverage: {:.1}% (need {:.1}%)",
                    achieved * 100.0,
                    required * 100.0
                )
            }
            Self::Unsolvable { remaining, method } => {
                write!(f, "Level is unsolvable ({method}): {remaining} vines stuck")
            }
            Self::DepthExceeded { depth, limit } => {
                write!(f, "Blocking depth {depth} exceeds the tier limit of {limit}")
            }
            Self::SearchBudgetExhausted {
                max_states,
                states_explored,
            } => {
                write!(
                    f,
                    "Solvability search exhausted its budget of {max_states} states after exploring {states_explored}"
                )
            }
            Self::Timeout {
                elapsed,
                limit,
                hard,
                ..
            } => {
                let kind = if *hard { "hard" } else { "soft" };
                write!(
                    f,
                    "Generation hit the {kind} timeout of {:.1}s after {:.1}s",
                    limit.as_secs_f64(),
                    elapsed.as_secs_f64()
                )
            }
            Self::Persistence {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "Invalid JSON in '{}': {source}", path.display())
            }
            Self::InvalidVine { vine_id, reason } => {
                write!(f, "Invalid vine {vine_id}: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::UnknownStrategy { name, available } => {
                write!(
                    f,
                    "Unknown placement strategy '{name}' (available: {})",
                    available.join(", ")
                )
            }
            Self::AttemptsExhausted {
                level_id,
                attempts,
                dump,
                last,
            } => {
                write!(f, "Level {level_id} failed after {attempts} attempts")?;
                if let Some(last) = last {
                    write!(f, "; last failure: {last}")?;
                }
                if let Some(dump) = dump {
                    write!(f, " (dump: {})", dump.display())?;
                }
                Ok(())
            }
            Self::ValidationFailed { failed, total } => {
                write!(f, "{failed} of {total} levels failed validation")
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::AttemptsExhausted {
                last: Some(last), ..
            } => Some(last.as_ref()),
            _ => None,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Attaches the file involved to persistence and serialization errors
pub trait WithPath<T> {
    /// Record the path and operation on the error
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T, E> WithPath<T> for std::result::Result<T, E>
where
    E: Into<GenerationError>,
{
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                GenerationError::Persistence {
                    path: error_path,
                    operation: error_operation,
                    ..
                } => {
                    *error_path = path.to_path_buf();
                    *error_operation = operation;
                }
                GenerationError::Serialization {
                    path: error_path, ..
                } => {
                    *error_path = path.to_path_buf();
                }
                _ => {}
            }
            error
        })
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a placement error
pub fn placement_failure(vine_id: &str, reason: &impl ToString) -> GenerationError {
    GenerationError::Placement {
        vine_id: vine_id.to_string(),
        reason: reason.to_string(),
    }
}
