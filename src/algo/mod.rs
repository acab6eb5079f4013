//! Mesh processing algorithms.
//!
//! - **Feature marking**: tag sharp and boundary edges as creases
//! - **Smoothing**: feature-preserving least-squares smoothing
//!
//! Long-running algorithms accept a [`Progress`] callback; non-fatal
//! degeneracies are reported through [`Diagnostics`].

pub mod diagnostics;
pub mod features;
pub mod progress;
pub mod smooth;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use progress::Progress;
