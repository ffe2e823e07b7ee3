// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across the workspace.

use thiserror::Error;

/// Errors that can occur while building or validating a core data record.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("device uevent missing required field: {0}")]
    MissingField(&'static str),

    #[error("unrecognized action: {0}")]
    UnknownAction(String),
}
