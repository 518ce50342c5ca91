//! Wallet challenge/response auth session for pmdash.
//!
//! Drives the nonce -> sign -> verify handshake against the backend,
//! persists the resulting bearer credential, and exposes the session
//! state machine. Signing itself is delegated to an injected
//! `WalletSigner`; a local alloy-backed implementation is provided.

pub mod error;
pub mod session;
pub mod signer;
pub mod store;

pub use error::{AuthError, AuthResult};
pub use session::{AuthBackend, AuthSession, SessionPhase};
pub use signer::{LocalWalletSigner, WalletSigner};
pub use store::TokenStore;
