// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The rule database contract.
//!
//! Parsing and applying device-naming rules is explicitly out of scope
//! here; this module only fixes the boundary a worker's runtime talks
//! across, grounded in `udev_rules_new()` / `udev_rules_apply_to_event()`
//! and the 3-second staleness check around `last_config_check_usec` in
//! `original_source/src/udev/udevd.c`.

use async_trait::async_trait;
use udevd_core::Device;

use crate::error::RuleEngineError;

/// A reloadable database of device-naming rules.
#[async_trait]
pub trait RuleEngine: Send + Sync + 'static {
    /// (Re)load the rule set from its source, replacing any previously
    /// loaded rules.
    async fn load(&mut self) -> Result<(), RuleEngineError>;

    /// Whether the currently loaded rules are still current. Callers
    /// throttle this check (at most every few seconds) rather than
    /// calling it on every dispatch.
    fn is_current(&self) -> bool;

    /// Apply the loaded rules to one device, mutating it in place with
    /// any name/symlink/property/permission decisions the rules make.
    async fn apply_to_event(&self, device: &mut Device) -> Result<(), RuleEngineError>;
}

/// In-memory stand-in used by tests that exercise the supervisor loop
/// without a real rule database on disk.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeRuleEngine {
    pub current: bool,
    pub load_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeRuleEngine {
    pub fn new() -> Self {
        Self { current: true, load_calls: std::sync::atomic::AtomicUsize::new(0) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl RuleEngine for FakeRuleEngine {
    async fn load(&mut self) -> Result<(), RuleEngineError> {
        self.load_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    fn is_current(&self) -> bool {
        self.current
    }

    async fn apply_to_event(&self, _device: &mut Device) -> Result<(), RuleEngineError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
