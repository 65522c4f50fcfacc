use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Opaque identity of a neighbor in the trust graph.
///
/// Equality and hashing are content-based; the wire/storage representation
/// is an embedder concern, so `NodeId` only promises a stable `Display`
/// rendering it can round-trip through `FromStr`.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct NodeId([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNodeIdError {
    #[error("node id is not valid base58")]
    Invalid,
    #[error("decoded node id is {0} bytes, expected 32")]
    WrongSize(usize),
}

impl NodeId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseNodeIdError> {
        <[u8; 32]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ParseNodeIdError::WrongSize(bytes.len()))
    }

    /// A fresh random identity. Convenience for tests and embedders; not
    /// part of the protocol core, which never manufactures NodeIds itself.
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParseNodeIdError::Invalid)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}
