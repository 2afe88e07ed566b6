// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for graph construction.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a classified skeleton into a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Classification or labeling failed.
    #[error(transparent)]
    Core(#[from] toska_core::Error),

    /// A branch must leave its run of chain pixels exactly twice (or never, for a ring).
    #[error("branch {branch} touches nodes {touches} times, expected 0 or 2")]
    MalformedBranch { branch: u32, touches: usize },

    /// The branch label map does not cover the classification.
    #[error("branch labels of shape {branches:?} do not match classification of shape {classified:?}")]
    ShapeMismatch {
        classified: Vec<usize>,
        branches: Vec<usize>,
    },
}
