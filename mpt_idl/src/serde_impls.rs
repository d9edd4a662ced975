pub mod serde_base58_address {
    use serde::Deserialize;
    use solana_address::Address;
    use std::str::FromStr;

    pub fn serialize<S>(val: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub mod serde_base58_address_option {
    use serde::Deserialize;
    use solana_address::Address;
    use std::str::FromStr;

    pub fn serialize<S>(val: &Option<Address>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match val {
            Some(value) => serializer.serialize_some(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| Address::from_str(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Byte strings are stored as hex so seeds and discriminants stay readable in the artifact.
pub mod serde_hex_bytes {
    use serde::Deserialize;

    pub fn serialize<S>(val: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(val))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
