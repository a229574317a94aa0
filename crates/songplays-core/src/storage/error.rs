use std::io;

use snafu::{Backtrace, prelude::*};

/// Errors that can occur while discovering input files or preparing output
/// directories.
///
/// Each I/O variant names the filesystem operation that failed so a message
/// like "cannot list" vs "cannot clear" points at the right root.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// A directory under the input root could not be listed.
    #[snafu(display("Cannot list record files in {path}: {source}"))]
    ListDir {
        /// The directory being listed.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A table subpath could not be removed before it was rewritten.
    #[snafu(display("Cannot clear previous output at {path}: {source}"))]
    ClearDir {
        /// The table subpath being cleared.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A table subpath could not be created.
    #[snafu(display("Cannot create output directory {path}: {source}"))]
    CreateDir {
        /// The directory being created.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A relative root could not be made absolute.
    #[snafu(display("Cannot resolve root {path} against the working directory: {source}"))]
    ResolveRoot {
        /// The root as given.
        path: String,
        /// Underlying filesystem error.
        source: io::Error,
    },

    /// The location string could not be interpreted as a supported backend.
    #[snafu(display("Invalid storage location '{spec}': {reason}"))]
    InvalidLocation {
        /// The location string supplied by the caller.
        spec: String,
        /// Why the location was rejected.
        reason: String,
    },
}
