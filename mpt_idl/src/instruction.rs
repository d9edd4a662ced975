use crate::{
    serde_impls::{serde_base58_address_option, serde_hex_bytes},
    ty::IdlField,
    IdlDiscriminant, ItemDescription,
};
use serde::{Deserialize, Serialize};
use solana_address::Address;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(with = "serde_hex_bytes")]
    pub discriminant: IdlDiscriminant,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub docs: ItemDescription,
    pub accounts: Vec<IdlAccountItem>,
    pub args: Vec<IdlField>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct IdlAccountItem {
    pub name: String,
    pub writable: bool,
    pub signer: bool,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub docs: ItemDescription,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub seeds: Option<Vec<IdlSeed>>,
    #[serde(
        with = "serde_base58_address_option",
        skip_serializing_if = "crate::is_default",
        default
    )]
    pub address: Option<Address>,
}

impl IdlAccountItem {
    pub fn new(name: &str, writable: bool, signer: bool) -> Self {
        Self {
            name: name.into(),
            writable,
            signer,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_seeds(mut self, seeds: Vec<IdlSeed>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Seeds a client can derive from constants and instruction arguments alone.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IdlSeed {
    Const(#[serde(with = "serde_hex_bytes")] Vec<u8>),
    Arg(String),
}
