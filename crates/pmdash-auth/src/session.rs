//! Auth session state machine.
//!
//! disconnected -> awaiting-signature -> verifying -> authenticated, with
//! failed reachable from the two middle states. Any failure stores no
//! token. Disconnecting is purely local: drop the token, no server call.

use crate::error::AuthResult;
use crate::signer::WalletSigner;
use crate::store::TokenStore;
use pmdash_api::{ApiResult, NonceChallenge, VerifiedSession};
use pmdash_core::Credential;
use tracing::{info, warn};

/// Backend surface the session needs; implemented by `ApiClient` and
/// stubbed in tests.
pub trait AuthBackend {
    fn request_nonce(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = ApiResult<NonceChallenge>> + Send;

    fn verify_signature(
        &self,
        address: &str,
        signature: &str,
    ) -> impl std::future::Future<Output = ApiResult<VerifiedSession>> + Send;
}

impl AuthBackend for pmdash_api::ApiClient {
    async fn request_nonce(&self, address: &str) -> ApiResult<NonceChallenge> {
        pmdash_api::ApiClient::request_nonce(self, address).await
    }

    async fn verify_signature(&self, address: &str, signature: &str) -> ApiResult<VerifiedSession> {
        pmdash_api::ApiClient::verify_signature(self, address, signature).await
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    AwaitingSignature,
    Verifying,
    Authenticated,
    Failed,
}

/// Wallet auth session.
///
/// Construction reloads any persisted credential, so an authenticated
/// session survives a restart without a fresh handshake.
pub struct AuthSession<B: AuthBackend, S: WalletSigner> {
    backend: B,
    signer: S,
    store: TokenStore,
    phase: SessionPhase,
    credential: Option<Credential>,
}

impl<B: AuthBackend, S: WalletSigner> AuthSession<B, S> {
    pub fn new(backend: B, signer: S, store: TokenStore) -> Self {
        let credential = store.load();
        let phase = if credential.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Disconnected
        };

        Self {
            backend,
            signer,
            store,
            phase,
            credential,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Credential for attaching to commands, when authenticated.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Run the full handshake: nonce -> sign -> verify -> persist.
    ///
    /// On any failure the phase becomes `Failed`, nothing is persisted,
    /// and the previous credential (if any) is discarded from memory.
    pub async fn connect(&mut self) -> AuthResult<Credential> {
        let address = self.signer.address();
        self.phase = SessionPhase::AwaitingSignature;

        let challenge = match self.backend.request_nonce(&address).await {
            Ok(challenge) => challenge,
            Err(e) => return Err(self.fail(e.into())),
        };

        let signature = match self.signer.sign_message(&challenge.message).await {
            Ok(signature) => signature,
            Err(e) => return Err(self.fail(e)),
        };

        self.phase = SessionPhase::Verifying;

        let verified = match self.backend.verify_signature(&address, &signature).await {
            Ok(verified) => verified,
            Err(e) => return Err(self.fail(e.into())),
        };

        let credential = Credential::new(verified.token);
        if let Err(e) = self.store.save(&credential) {
            return Err(self.fail(e));
        }
        self.credential = Some(credential.clone());
        self.phase = SessionPhase::Authenticated;

        info!(%address, "Wallet session authenticated");
        Ok(credential)
    }

    /// Local logout: discard the stored token and reset. No server call.
    pub fn disconnect(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(%e, "Failed to clear persisted credential");
        }
        self.credential = None;
        self.phase = SessionPhase::Disconnected;
        info!("Wallet session disconnected");
    }

    fn fail(&mut self, e: crate::error::AuthError) -> crate::error::AuthError {
        warn!(%e, "Wallet handshake failed");
        self.phase = SessionPhase::Failed;
        self.credential = None;
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, AuthResult};
    use pmdash_api::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> TokenStore {
        let dir = std::env::temp_dir().join(format!(
            "pmdash-auth-session-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        TokenStore::new(dir)
    }

    struct StubBackend {
        fail_nonce: bool,
        fail_verify: bool,
        token: String,
        verify_calls: Mutex<Vec<(String, String)>>,
    }

    impl StubBackend {
        fn ok(token: &str) -> Self {
            Self {
                fail_nonce: false,
                fail_verify: false,
                token: token.to_string(),
                verify_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl AuthBackend for StubBackend {
        async fn request_nonce(&self, address: &str) -> ApiResult<NonceChallenge> {
            if self.fail_nonce {
                return Err(ApiError::Status {
                    status: 400,
                    body: "invalid address".to_string(),
                });
            }
            Ok(NonceChallenge {
                address: address.to_string(),
                nonce: "n1".to_string(),
                message: "Sign this message to authenticate: n1".to_string(),
            })
        }

        async fn verify_signature(
            &self,
            address: &str,
            signature: &str,
        ) -> ApiResult<VerifiedSession> {
            self.verify_calls
                .lock()
                .unwrap()
                .push((address.to_string(), signature.to_string()));
            if self.fail_verify {
                return Err(ApiError::Status {
                    status: 400,
                    body: "signature mismatch".to_string(),
                });
            }
            Ok(VerifiedSession {
                token: self.token.clone(),
                address: address.to_string(),
            })
        }
    }

    struct StubSigner {
        signed: Mutex<Vec<String>>,
    }

    impl StubSigner {
        fn new() -> Self {
            Self {
                signed: Mutex::new(Vec::new()),
            }
        }
    }

    impl WalletSigner for StubSigner {
        fn address(&self) -> String {
            "0xabc".to_string()
        }

        async fn sign_message(&self, message: &str) -> AuthResult<String> {
            self.signed.lock().unwrap().push(message.to_string());
            Ok("sig".to_string())
        }
    }

    #[tokio::test]
    async fn test_successful_handshake_persists_token() {
        let store = temp_store();
        let mut session = AuthSession::new(StubBackend::ok("t1"), StubSigner::new(), store);
        assert_eq!(session.phase(), SessionPhase::Disconnected);

        let cred = session.connect().await.unwrap();
        assert_eq!(cred.header_value(), "Bearer t1");
        assert_eq!(session.phase(), SessionPhase::Authenticated);

        // Token is retrievable from durable storage.
        let reloaded = session.store.load().expect("token persisted");
        assert_eq!(reloaded.token(), "t1");

        session.disconnect();
    }

    #[tokio::test]
    async fn test_signer_sees_the_challenge_message() {
        let store = temp_store();
        let signer = StubSigner::new();
        let mut session = AuthSession::new(StubBackend::ok("t1"), signer, store);
        session.connect().await.unwrap();

        let signed = session.signer.signed.lock().unwrap();
        assert_eq!(signed.as_slice(), ["Sign this message to authenticate: n1"]);
        drop(signed);

        let calls = session.backend.verify_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), [("0xabc".to_string(), "sig".to_string())]);
        drop(calls);

        session.disconnect();
    }

    #[tokio::test]
    async fn test_nonce_failure_stores_nothing() {
        let store = temp_store();
        let backend = StubBackend {
            fail_nonce: true,
            ..StubBackend::ok("t1")
        };
        let mut session = AuthSession::new(backend, StubSigner::new(), store);

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, AuthError::Api(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.credential().is_none());
        assert!(session.store.load().is_none());
    }

    #[tokio::test]
    async fn test_verify_failure_stores_nothing() {
        let store = temp_store();
        let backend = StubBackend {
            fail_verify: true,
            ..StubBackend::ok("t1")
        };
        let mut session = AuthSession::new(backend, StubSigner::new(), store);

        session.connect().await.unwrap_err();
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.store.load().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_fails_session_and_keeps_no_credential() {
        // State dir rooted beneath a plain file: create_dir_all cannot
        // succeed, so persisting the token fails after a good handshake.
        let blocker = std::env::temp_dir().join(format!(
            "pmdash-auth-session-blocker-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = TokenStore::new(blocker.join("state"));

        let mut session = AuthSession::new(StubBackend::ok("t1"), StubSigner::new(), store);
        let err = session.connect().await.unwrap_err();

        assert!(matches!(err, AuthError::Store(_)));
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.credential().is_none());
        assert!(session.store.load().is_none());

        std::fs::remove_file(&blocker).unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_is_local_and_clears_token() {
        let store = temp_store();
        let mut session = AuthSession::new(StubBackend::ok("t1"), StubSigner::new(), store);
        session.connect().await.unwrap();

        session.disconnect();
        assert_eq!(session.phase(), SessionPhase::Disconnected);
        assert!(session.credential().is_none());
        assert!(session.store.load().is_none());
    }

    #[tokio::test]
    async fn test_persisted_token_survives_reconstruction() {
        let dir = std::env::temp_dir().join(format!(
            "pmdash-auth-session-reload-{}",
            std::process::id()
        ));
        let mut session = AuthSession::new(
            StubBackend::ok("t1"),
            StubSigner::new(),
            TokenStore::new(&dir),
        );
        session.connect().await.unwrap();

        // Same storage scope, fresh session: still authenticated.
        let revived = AuthSession::new(StubBackend::ok("t2"), StubSigner::new(), TokenStore::new(&dir));
        assert_eq!(revived.phase(), SessionPhase::Authenticated);
        assert_eq!(revived.credential().unwrap().token(), "t1");

        session.disconnect();
    }
}
