//! Wallet signing capability.
//!
//! The session only needs "sign this message for this address"; where the
//! key lives is the caller's business. `LocalWalletSigner` covers
//! operators who keep a raw key on the box.

use crate::error::{AuthError, AuthResult};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;

/// Injected wallet capability: an address plus the ability to sign an
/// arbitrary text message for it.
pub trait WalletSigner {
    /// The wallet address, 0x-prefixed lowercase hex.
    fn address(&self) -> String;

    /// EIP-191 personal-sign over `message`, returned as 0x-prefixed hex.
    fn sign_message(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = AuthResult<String>> + Send;
}

/// Signer backed by a locally-held private key.
///
/// Never logs key material; the inner signer owns secure key storage.
pub struct LocalWalletSigner {
    inner: PrivateKeySigner,
}

impl LocalWalletSigner {
    /// Build from a hex-encoded private key (with or without 0x prefix).
    pub fn from_hex(key_hex: &str) -> AuthResult<Self> {
        let inner: PrivateKeySigner = key_hex
            .trim()
            .parse()
            .map_err(|e| AuthError::InvalidKey(format!("Invalid private key: {e}")))?;
        Ok(Self { inner })
    }
}

impl WalletSigner for LocalWalletSigner {
    fn address(&self) -> String {
        format!("0x{}", hex::encode(self.inner.address().as_slice()))
    }

    async fn sign_message(&self, message: &str) -> AuthResult<String> {
        let signature = self
            .inner
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| AuthError::Signer(format!("Signing failed: {e}")))?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}
