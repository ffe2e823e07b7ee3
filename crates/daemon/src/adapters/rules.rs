// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A reduced-scope rule engine: applies only the manager's user-defined
//! property overrides (`SET_ENV`), not a full `udev.rules` grammar.
//!
//! Full rule-file parsing is out of scope (the rule engine is one of the
//! explicitly out-of-scope external collaborators); this adapter covers
//! exactly the piece the supervisor itself owns — the `properties`
//! hashmap in `Manager` that `on_ctrl_msg`'s `SET_ENV` branch mutates
//! (`original_source/src/udev/udevd.c:957-1003`) — and applies it to
//! every event as a property overlay.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use udevd_core::Device;
use udevd_ports::{RuleEngine, RuleEngineError};

#[derive(Clone, Default)]
pub struct PropertyOverrideRuleEngine {
    properties: Arc<RwLock<HashMap<String, String>>>,
}

impl PropertyOverrideRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `SET_ENV key=value` (or `key=` to unset) control message.
    pub fn set_env(&self, key: String, value: Option<String>) {
        let mut properties = self.properties.write();
        match value {
            Some(value) => {
                properties.insert(key, value);
            }
            None => {
                properties.remove(&key);
            }
        }
    }
}

#[async_trait]
impl RuleEngine for PropertyOverrideRuleEngine {
    async fn load(&mut self) -> Result<(), RuleEngineError> {
        Ok(())
    }

    fn is_current(&self) -> bool {
        true
    }

    async fn apply_to_event(&self, device: &mut Device) -> Result<(), RuleEngineError> {
        let properties = self.properties.read();
        if let Some(devtype) = properties.get("DEVTYPE") {
            device.devtype = Some(devtype.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
