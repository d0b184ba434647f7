// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Error types for partition k-means

use arrow_schema::ArrowError;
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the clustering of a partition.
///
/// None of these are recoverable: when one is raised, no label is produced
/// for any row of the partition.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A row vector is absent, has the wrong rank or dimension, or contains a
    /// missing element. Also raised for an unusable `k`.
    #[snafu(display("Invalid input vector: {message}, {location}"))]
    InvalidInput { message: String, location: Location },

    /// The caller supplied initial centroids of the wrong shape, or with a
    /// missing element.
    #[snafu(display("Invalid initial centroids: {message}, {location}"))]
    InvalidInitialCentroids { message: String, location: Location },

    #[snafu(display("LanceError(Arrow): {source}, {location}"))]
    Arrow {
        source: ArrowError,
        location: Location,
    },
}

impl Error {
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self::InvalidInput {
            message: message.into(),
            location: Location::new(caller.file(), caller.line(), caller.column()),
        }
    }

    #[track_caller]
    pub fn invalid_initial_centroids(message: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self::InvalidInitialCentroids {
            message: message.into(),
            location: Location::new(caller.file(), caller.line(), caller.column()),
        }
    }
}

impl From<ArrowError> for Error {
    #[track_caller]
    fn from(source: ArrowError) -> Self {
        let caller = std::panic::Location::caller();
        Self::Arrow {
            source,
            location: Location::new(caller.file(), caller.line(), caller.column()),
        }
    }
}

impl From<Error> for ArrowError {
    fn from(value: Error) -> Self {
        Self::ExternalError(Box::new(value))
    }
}
