// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::ModelsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Size in bytes of a hash
pub const HASH_SIZE_BYTES: usize = 32;

/// Blake3 digest, displayed in bs58 with checksum.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct Hash([u8; HASH_SIZE_BYTES]);

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl Hash {
    /// Compute a hash from data.
    ///
    /// # Example
    ///  ```
    /// # use tenderbake_models::hash::Hash;
    /// let hash = Hash::compute_from("hello world".as_bytes());
    /// ```
    pub fn compute_from(data: &[u8]) -> Self {
        Hash(*blake3::hash(data).as_bytes())
    }

    /// Serialize a Hash using bs58 encoding with checksum.
    pub fn to_bs58_check(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }

    /// Serialize a Hash as bytes.
    pub fn to_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.0
    }

    /// Deserialize using bs58 encoding with checksum.
    ///
    /// # Example
    ///  ```
    /// # use tenderbake_models::hash::Hash;
    /// let hash = Hash::compute_from("hello world".as_bytes());
    /// let serialized: String = hash.to_bs58_check();
    /// let deserialized: Hash = Hash::from_bs58_check(&serialized).unwrap();
    /// assert_eq!(hash, deserialized);
    /// ```
    pub fn from_bs58_check(data: &str) -> Result<Hash, ModelsError> {
        let decoded = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| ModelsError::HashParseError(err.to_string()))?;
        let bytes: [u8; HASH_SIZE_BYTES] = decoded.as_slice().try_into().map_err(|_| {
            ModelsError::HashParseError(format!("expected {} bytes", HASH_SIZE_BYTES))
        })?;
        Ok(Hash(bytes))
    }
}

impl FromStr for Hash {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_bs58_check(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_bs58_check())
        } else {
            s.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        if d.is_human_readable() {
            let s = String::deserialize(d)?;
            Hash::from_bs58_check(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(d)?;
            let bytes: [u8; HASH_SIZE_BYTES] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))?;
            Ok(Hash(bytes))
        }
    }
}

macro_rules! hash_identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Hash);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name(Hash::from_str(s)?))
            }
        }
    };
}

hash_identifier!(
    /// Identity of an operation, digest of its contents
    OperationId
);
hash_identifier!(
    /// Identity of a block
    BlockHash
);
hash_identifier!(
    /// Identity of a block payload, disambiguates proposals at the same level and round
    PayloadHash
);
