//! Simulator error definitions.
//!
//! All failures surface before the cycle driver starts: unreadable or
//! malformed programs, programs naming registers the configured machine does
//! not have, and invalid configuration files. Stage logic itself is
//! infallible; once a program is loaded the pipeline never errors.

use thiserror::Error;

/// Host-facing simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// The program file could not be read.
    #[error("unable to read {path}: {source}")]
    Io {
        /// Path of the file that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An assembly line failed to parse.
    #[error("parse error at line {line}: {msg}")]
    Parse {
        /// 1-based line number in the program file.
        line: usize,
        /// What went wrong with the line.
        msg: String,
    },

    /// A well-formed program violates a machine limit.
    #[error("invalid program at instruction {index}: {msg}")]
    Program {
        /// 0-based code-memory index of the offending instruction.
        index: usize,
        /// Description of the violated limit.
        msg: String,
    },

    /// The configuration file could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(String),
}
