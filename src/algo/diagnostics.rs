//! Non-fatal geometric warnings raised while smoothing.
//!
//! Degenerate input geometry (a face whose normal has zero length, a feature
//! vertex whose two crease neighbours coincide) does not stop the smoother.
//! Each occurrence is turned into a [`Diagnostic`] and handed to a
//! [`Diagnostics`] sink. The default sink forwards to the `log` crate at
//! `warn` level.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use crease::algo::{Diagnostic, Diagnostics};
//!
//! let collected = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&collected);
//! let diagnostics = Diagnostics::new(move |d: &Diagnostic| sink.lock().unwrap().push(*d));
//!
//! diagnostics.emit(&Diagnostic::DegenerateFeatureTangent { iteration: 0, vertex: 7 });
//! assert_eq!(collected.lock().unwrap().len(), 1);
//! ```

use std::fmt;

/// A recoverable geometric degeneracy found during system assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// A face incident to a regular vertex has a zero-length stored normal.
    ///
    /// Its tangent-plane row is still emitted and contributes nothing.
    ZeroLengthFaceNormal {
        /// Smoothing iteration (zero-based).
        iteration: usize,
        /// The regular vertex whose row uses the normal.
        vertex: usize,
        /// The degenerate face.
        face: usize,
    },

    /// The two crease neighbours of a feature vertex coincide.
    ///
    /// The tangent direction is zero, so the vertex is softly held in place.
    DegenerateFeatureTangent {
        /// Smoothing iteration (zero-based).
        iteration: usize,
        /// The feature vertex.
        vertex: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ZeroLengthFaceNormal {
                iteration,
                vertex,
                face,
            } => write!(
                f,
                "iteration {}: zero length normal on face {} (around vertex {})",
                iteration, face, vertex
            ),
            Diagnostic::DegenerateFeatureTangent { iteration, vertex } => write!(
                f,
                "iteration {}: zero length crease tangent at vertex {}",
                iteration, vertex
            ),
        }
    }
}

/// A sink receiving [`Diagnostic`]s.
///
/// Diagnostics are emitted in ascending vertex order within an iteration,
/// regardless of whether assembly ran in parallel.
pub struct Diagnostics {
    callback: Box<dyn Fn(&Diagnostic) + Send + Sync>,
}

impl Diagnostics {
    /// Create a sink with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// A sink that logs every diagnostic with `log::warn!`.
    pub fn log() -> Self {
        Self::new(|d| log::warn!("{}", d))
    }

    /// A sink that discards everything.
    pub fn ignore() -> Self {
        Self::new(|_| {})
    }

    /// Hand a diagnostic to the sink.
    #[inline]
    pub fn emit(&self, diagnostic: &Diagnostic) {
        (self.callback)(diagnostic);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::log()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}
