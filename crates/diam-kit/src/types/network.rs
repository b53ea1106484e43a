//! Network identification.

use std::fmt;

use sha2::{Digest, Sha256};

/// Passphrase of the Diamante test network.
pub const TESTNET_PASSPHRASE: &str = "Diamante Testnet 2024";

/// The network transactions are signed for.
///
/// The network id mixed into every signature is the SHA-256 of the
/// passphrase, so a transaction signed for one network is invalid on another.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Diamante testnet.
    #[default]
    Testnet,
    /// Any other network, identified by its passphrase.
    Custom(String),
}

impl Network {
    /// A network with the given passphrase.
    pub fn custom(passphrase: impl Into<String>) -> Self {
        Network::Custom(passphrase.into())
    }

    /// Returns true if this is the Diamante testnet.
    pub fn is_testnet(&self) -> bool {
        match self {
            Network::Testnet => true,
            Network::Custom(p) => p == TESTNET_PASSPHRASE,
        }
    }

    /// The network passphrase.
    pub fn passphrase(&self) -> &str {
        match self {
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Custom(p) => p,
        }
    }

    /// The network id used in signatures.
    pub fn id(&self) -> NetworkId {
        NetworkId(Sha256::digest(self.passphrase().as_bytes()).into())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => f.write_str("testnet"),
            Network::Custom(p) => write!(f, "custom ({})", p),
        }
    }
}

/// SHA-256 of a network passphrase.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId([u8; 32]);

impl NetworkId {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkId({})", hex::encode(self.0))
    }
}
