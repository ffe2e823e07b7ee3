// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use udevd_core::WorkerId;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker {0} is already attached to an event")]
    AlreadyAttached(WorkerId),

    #[error("no worker with id {0}")]
    UnknownWorker(WorkerId),

    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),
}
