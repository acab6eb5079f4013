//! Error types for crease.
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! is [`MeshError`]. Recoverable geometric degeneracies are *not* errors; they
//! are reported through [`crate::algo::Diagnostics`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction, I/O and smoothing.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The same directed edge is used by two faces.
    #[error("edge ({v0}, {v1}) has more than two incident faces or inconsistent orientation")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Two or more boundary loops touch the same vertex.
    #[error("vertex {vertex} is non-manifold (pinched boundary)")]
    NonManifoldVertex {
        /// The offending vertex.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// The least-squares system of a smoothing iteration could not be solved.
    ///
    /// The mesh keeps the positions produced by the last completed iteration.
    #[error("least-squares solve failed in iteration {iteration}: {reason}")]
    SolverFailed {
        /// Zero-based smoothing iteration that failed.
        iteration: usize,
        /// What went wrong.
        reason: String,
    },

    /// An internal consistency check failed during system assembly.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a solver failure for the given iteration.
    pub fn solver_failed(iteration: usize, reason: impl Into<String>) -> Self {
        MeshError::SolverFailed {
            iteration,
            reason: reason.into(),
        }
    }
}
