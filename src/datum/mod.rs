//! Strongly-keyed datum parameters for on-chain order construction.
//!
//! Each DEX declares an [`OrderTemplate`] naming the parameter keys its order
//! datum recognizes. [`DatumParameters`] is validated against the template at
//! order-build time, so a missing or stray key fails before any serialization
//! happens. The binary encoding itself is performed by an external
//! [`DefinitionBuilder`] collaborator.

use crate::core::{SwapError, SwapResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Closed set of parameter keys recognized across order templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumParameterKey {
    SenderPubKeyHash,
    SenderStakingKeyHash,
    ReceiverPubKeyHash,
    ReceiverStakingKeyHash,
    Action,
    Expiration,
    PoolAssetAPolicyId,
    PoolAssetAAssetName,
    PoolAssetBPolicyId,
    PoolAssetBAssetName,
    SwapInTokenPolicyId,
    SwapInTokenAssetName,
    SwapOutTokenPolicyId,
    SwapOutTokenAssetName,
    SwapInAmount,
    MinReceive,
}

impl fmt::Display for DatumParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatumParameterValue {
    Int(u128),
    String(String),
}

impl DatumParameterValue {
    pub fn as_int(&self) -> Option<u128> {
        match self {
            DatumParameterValue::Int(value) => Some(*value),
            DatumParameterValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatumParameterValue::Int(_) => None,
            DatumParameterValue::String(value) => Some(value),
        }
    }
}

/// A named on-chain order layout and the parameter keys it accepts.
#[derive(Debug, Clone, Copy)]
pub struct OrderTemplate {
    pub name: &'static str,
    pub required: &'static [DatumParameterKey],
    pub optional: &'static [DatumParameterKey],
}

impl OrderTemplate {
    pub fn recognizes(&self, key: DatumParameterKey) -> bool {
        self.required.contains(&key) || self.optional.contains(&key)
    }
}

/// Parameter map pushed into a [`DefinitionBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatumParameters {
    values: HashMap<DatumParameterKey, DatumParameterValue>,
}

impl DatumParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: DatumParameterKey, value: DatumParameterValue) -> &mut Self {
        self.values.insert(key, value);
        self
    }

    pub fn push_int(&mut self, key: DatumParameterKey, value: u128) -> &mut Self {
        self.push(key, DatumParameterValue::Int(value))
    }

    pub fn push_string(
        &mut self,
        key: DatumParameterKey,
        value: impl Into<String>,
    ) -> &mut Self {
        self.push(key, DatumParameterValue::String(value.into()))
    }

    pub fn get(&self, key: DatumParameterKey) -> Option<&DatumParameterValue> {
        self.values.get(&key)
    }

    pub fn int(&self, key: DatumParameterKey) -> Option<u128> {
        self.get(key).and_then(DatumParameterValue::as_int)
    }

    pub fn string(&self, key: DatumParameterKey) -> Option<&str> {
        self.get(key).and_then(DatumParameterValue::as_str)
    }

    pub fn contains(&self, key: DatumParameterKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check this parameter set against a template: every required key must be
    /// present and every present key must be recognized.
    pub fn validate_for(&self, template: &OrderTemplate) -> SwapResult<()> {
        for key in template.required {
            if !self.contains(*key) {
                return Err(SwapError::DatumError(format!(
                    "missing required parameter {} for order template {}",
                    key, template.name
                )));
            }
        }

        for key in self.values.keys() {
            if !template.recognizes(*key) {
                return Err(SwapError::DatumError(format!(
                    "parameter {} is not recognized by order template {}",
                    key, template.name
                )));
            }
        }

        Ok(())
    }
}

/// External datum/CBOR encoder, consumed as an opaque
/// load -> push parameters -> serialize contract.
pub trait DefinitionBuilder: Send {
    fn load_template(&mut self, template: &OrderTemplate) -> SwapResult<()>;
    fn push_parameters(&mut self, parameters: &DatumParameters) -> SwapResult<()>;
    /// Produce the CBOR hex of the loaded template with its pushed parameters.
    fn serialize(&self) -> SwapResult<String>;
}

pub trait DefinitionBuilderFactory: Send + Sync {
    fn new_builder(&self) -> Box<dyn DefinitionBuilder>;
}
