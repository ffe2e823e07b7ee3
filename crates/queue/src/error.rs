// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("insert called from pid {caller} but queue is owned by pid {owner}")]
    NotOwner { caller: u32, owner: u32 },

    #[error("queue marker I/O error: {0}")]
    Marker(#[from] std::io::Error),
}
