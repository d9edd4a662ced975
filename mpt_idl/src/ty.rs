use crate::ItemDescription;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IdlField {
    pub name: String,
    #[serde(skip_serializing_if = "crate::is_default", default)]
    pub docs: ItemDescription,
    #[serde(rename = "type")]
    pub ty: IdlTypeDef,
}

impl IdlField {
    pub fn new(name: &str, ty: IdlTypeDef) -> Self {
        Self {
            name: name.into(),
            docs: Vec::new(),
            ty,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IdlTypeDef {
    Bool,
    U8,
    U16,
    U32,
    U64,
    Address,
    /// Length prefixed (`u32`) byte string.
    Bytes,
    Array(Box<IdlTypeDef>, usize),
    /// Length prefixed (`u32`) list.
    Vec(Box<IdlTypeDef>),
    Struct(Vec<IdlField>),
    /// A type declared elsewhere in the definition, by name.
    Defined(String),
}

impl IdlTypeDef {
    pub fn array(item: IdlTypeDef, len: usize) -> Self {
        Self::Array(Box::new(item), len)
    }

    pub fn vec(item: IdlTypeDef) -> Self {
        Self::Vec(Box::new(item))
    }

    /// Encoded size when it does not depend on the value.
    #[must_use]
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            IdlTypeDef::Bool | IdlTypeDef::U8 => Some(1),
            IdlTypeDef::U16 => Some(2),
            IdlTypeDef::U32 => Some(4),
            IdlTypeDef::U64 => Some(8),
            IdlTypeDef::Address => Some(32),
            IdlTypeDef::Array(item, len) => item.fixed_size().map(|size| size * len),
            IdlTypeDef::Struct(fields) => fields.iter().map(|f| f.ty.fixed_size()).sum(),
            IdlTypeDef::Bytes | IdlTypeDef::Vec(_) | IdlTypeDef::Defined(_) => None,
        }
    }
}
