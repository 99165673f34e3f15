//! The engine: session lifecycle, login, and the fragment pass.
//!
//! One engine instance serves one installation. It wires the record
//! store, resource fetcher, plaintext cache, and session store together
//! behind the operations the embedding layer calls.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use pagevault_authz::RoleResolver;
use pagevault_cascade::CascadeResolver;
use pagevault_core::{
    sha256_hex, Fragment, KeyType, OnDeniedAction, PrivateKey, RoleCryptoKey, RoleName, Session,
    SymmetricKey, UserRecord,
};
use pagevault_store::{RecordStore, ResourceCache, ResourceFetcher, SessionStore};

use crate::config::Config;
use crate::error::{login_failed, AuthError, ProtocolError, Result};
use crate::render::{PassOutcome, Renderer};

/// Outcome of comparing the remote document-set version with the cached
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDecision {
    /// Cached state is still valid.
    Unchanged,
    /// The documents changed; cached state was invalidated and the
    /// caller must re-run login.
    Changed,
}

/// The pagevault engine.
pub struct Engine<R, F, C, S> {
    records: Arc<R>,
    cache: Arc<C>,
    sessions: Arc<S>,
    cascade: CascadeResolver<R, F>,
    authz: RoleResolver<R>,
    config: Config,
}

impl<R, F, C, S> Engine<R, F, C, S>
where
    R: RecordStore,
    F: ResourceFetcher + 'static,
    C: ResourceCache,
    S: SessionStore,
{
    /// Wire up an engine over the given stores.
    pub fn new(
        records: Arc<R>,
        fetcher: Arc<F>,
        cache: Arc<C>,
        sessions: Arc<S>,
        config: Config,
    ) -> Self {
        Self {
            cascade: CascadeResolver::new(Arc::clone(&records), fetcher),
            authz: RoleResolver::new(Arc::clone(&records)),
            records,
            cache,
            sessions,
            config,
        }
    }

    /// The installation configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Login
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in with a password.
    ///
    /// Any prior session is dropped first, so a failed login never leaves
    /// the previous user's plaintext behind. All failures collapse to
    /// [`AuthError::LoginFailed`].
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        self.partial_logout().await.map_err(login_failed)?;

        let user = self
            .records
            .get_user(username)
            .await
            .map_err(login_failed)?;
        if user.key_type != KeyType::Password {
            return Err(login_failed("credential type is not password"));
        }

        let key = SymmetricKey::derive_from_password(password, &user.secret_algorithm.name)
            .map_err(login_failed)?;

        self.finish_login(username, user, key).await
    }

    /// Log in with a PKCS#8 PEM private key.
    ///
    /// The user record carries the account key wrapped to the user's
    /// public key; the private key unwraps it.
    pub async fn login_with_certificate(
        &self,
        username: &str,
        private_key_pem: &str,
    ) -> std::result::Result<Session, AuthError> {
        self.partial_logout().await.map_err(login_failed)?;

        let user = self
            .records
            .get_user(username)
            .await
            .map_err(login_failed)?;
        if user.key_type != KeyType::Certificate {
            return Err(login_failed("credential type is not certificate"));
        }

        let key_algorithm = user
            .key_algorithm
            .as_ref()
            .ok_or_else(|| login_failed("certificate record has no key-algorithm"))?;
        let key_secret = user
            .key_secret
            .as_ref()
            .ok_or_else(|| login_failed("certificate record has no key-secret"))?;

        let private = PrivateKey::from_pkcs8_pem(private_key_pem, &key_algorithm.name)
            .map_err(login_failed)?;
        let raw_key = private
            .unwrap_key(key_secret.as_slice())
            .map_err(login_failed)?;
        let key = SymmetricKey::import(&raw_key, &user.secret_algorithm.name)
            .map_err(login_failed)?;

        self.finish_login(username, user, key).await
    }

    /// Shared tail of both login paths: decrypt the user secret, resolve
    /// the cascade, fill the cache, persist the session.
    async fn finish_login(
        &self,
        username: &str,
        user: UserRecord,
        key: SymmetricKey,
    ) -> std::result::Result<Session, AuthError> {
        let payload = key
            .decrypt(&user.secret_algorithm, user.secret.as_slice())
            .map_err(login_failed)?;
        let role_keys = RoleCryptoKey::parse_list(&payload).map_err(login_failed)?;

        let resources = self
            .cascade
            .resolve(&role_keys)
            .await
            .map_err(login_failed)?;
        let resource_count = resources.len();
        self.cache.put_all(resources).await.map_err(login_failed)?;

        let session = Session::new(username, user.roles, logout_token(username));
        self.sessions.save(&session).await.map_err(login_failed)?;

        info!(
            username,
            resources = resource_count,
            "login complete"
        );
        Ok(session)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop the session and everything cached locally.
    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await?;
        self.cache.clear_all().await?;
        info!("logged out");
        Ok(())
    }

    /// Drop the session and cached plaintext, keeping cached documents.
    ///
    /// Runs before every login and when the document-set version changes.
    pub async fn partial_logout(&self) -> Result<()> {
        self.sessions.clear().await?;
        self.cache.clear_records_only().await?;
        Ok(())
    }

    /// Compare the remote document-set version against the session's
    /// cached one, invalidating local state on mismatch.
    pub async fn check_version(&self, remote_version: &str) -> Result<VersionDecision> {
        let Some(session) = self.sessions.load().await? else {
            return Ok(VersionDecision::Unchanged);
        };

        match session.cached_version.as_deref() {
            None => {
                // First sighting of a version for this session: adopt it.
                let session = session.with_version(remote_version);
                self.sessions.save(&session).await?;
                Ok(VersionDecision::Unchanged)
            }
            Some(cached) if cached == remote_version => Ok(VersionDecision::Unchanged),
            Some(cached) => {
                info!(cached, remote = remote_version, "documents changed, invalidating");
                self.partial_logout().await?;
                Ok(VersionDecision::Changed)
            }
        }
    }

    /// The active session, if any.
    pub async fn current_user(&self) -> Result<Option<Session>> {
        Ok(self.sessions.load().await?)
    }

    /// Whether a session is active.
    pub async fn logged_in(&self) -> Result<bool> {
        Ok(self.sessions.load().await?.is_some())
    }

    /// Whether the active session's user holds the given role, including
    /// inherited roles.
    pub async fn in_role(&self, role: &RoleName) -> Result<bool> {
        let Some(session) = self.sessions.load().await? else {
            return Ok(false);
        };
        let effective = self.authz.expand_roles(&session.roles).await?;
        Ok(effective.contains(role))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fragment Pass
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the policy pass over a page's fragments, in page order.
    ///
    /// Authorized fragments get their cached plaintext substituted in.
    /// Denied fragments follow their per-fragment action; a redirect stops
    /// the pass immediately so nothing after it is rendered.
    pub async fn process_fragments(
        &self,
        fragments: &[Fragment],
        renderer: &dyn Renderer,
    ) -> Result<PassOutcome> {
        let session = self.sessions.load().await?;
        let mut denied = false;

        for fragment in fragments {
            let authorized = self
                .authz
                .is_authorized(&fragment.resource_id, session.as_ref())
                .await?;

            if authorized {
                let cached = self
                    .cache
                    .get(&fragment.resource_id)
                    .await?
                    .ok_or_else(|| {
                        ProtocolError::MissingCacheEntry(fragment.resource_id.clone())
                    })?;
                renderer
                    .substitute_fragment(&fragment.resource_id, &cached.content)
                    .await;
                continue;
            }

            match fragment.on_denied_action {
                OnDeniedAction::Redirect => {
                    renderer.navigate(&self.config.denied_info_page).await;
                    return Ok(PassOutcome::Redirected);
                }
                OnDeniedAction::Unknown => {
                    warn!(
                        resource = %fragment.resource_id,
                        "unknown denied-action, redirecting"
                    );
                    renderer.navigate(&self.config.denied_info_page).await;
                    return Ok(PassOutcome::Redirected);
                }
                OnDeniedAction::Warn => {
                    renderer
                        .substitute_with_placeholder(
                            &fragment.resource_id,
                            &self.config.denied_info_element,
                        )
                        .await;
                    denied = true;
                }
                OnDeniedAction::Hide => {
                    denied = true;
                }
            }
        }

        Ok(if denied {
            PassOutcome::SomeDenied
        } else {
            PassOutcome::AllApproved
        })
    }
}

/// Day-stable logout token: the hash of the username and the current UTC
/// day number. The origin can verify it without any shared state beyond
/// the clock.
fn logout_token(username: &str) -> String {
    let day = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() / 86_400)
        .unwrap_or(0);
    sha256_hex(format!("{username}{day}").as_bytes())
}

#[cfg(test)]
mod tests {
    use pagevault_core::{DecryptedResource, ResourceId};
    use pagevault_store::{MemoryCache, MemoryFetcher, MemoryRecords, MemorySessions};

    use super::*;

    fn test_config() -> Config {
        Config {
            base_uri: "/vault/".to_string(),
            denied_info_page: "denied.html".to_string(),
            denied_info_element: "denied.part.html".to_string(),
            allow_cache: true,
            namespace: "test".to_string(),
        }
    }

    fn test_engine() -> Engine<MemoryRecords, MemoryFetcher, MemoryCache, MemorySessions> {
        Engine::new(
            Arc::new(MemoryRecords::new()),
            Arc::new(MemoryFetcher::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(MemorySessions::new()),
            test_config(),
        )
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_opaque() {
        let engine = test_engine();
        let err = engine
            .login_with_password("nobody", "password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::LoginFailed));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_cache() {
        let engine = test_engine();
        engine
            .sessions
            .save(&Session::new("alice", vec![], "t"))
            .await
            .unwrap();
        engine
            .cache
            .put_all(vec![DecryptedResource {
                resource_id: ResourceId::new("frag-1"),
                content: "x".to_string(),
            }])
            .await
            .unwrap();

        engine.logout().await.unwrap();
        assert!(!engine.logged_in().await.unwrap());
        assert!(engine
            .cache
            .get(&ResourceId::new("frag-1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_check_version_without_session() {
        let engine = test_engine();
        let decision = engine.check_version("v1").await.unwrap();
        assert_eq!(decision, VersionDecision::Unchanged);
    }

    #[tokio::test]
    async fn test_check_version_adopts_first_version() {
        let engine = test_engine();
        engine
            .sessions
            .save(&Session::new("alice", vec![], "t"))
            .await
            .unwrap();

        assert_eq!(
            engine.check_version("v1").await.unwrap(),
            VersionDecision::Unchanged
        );
        let session = engine.current_user().await.unwrap().unwrap();
        assert_eq!(session.cached_version.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_check_version_invalidates_on_change() {
        let engine = test_engine();
        engine
            .sessions
            .save(&Session::new("alice", vec![], "t").with_version("v1"))
            .await
            .unwrap();
        engine
            .cache
            .put_all(vec![DecryptedResource {
                resource_id: ResourceId::new("frag-1"),
                content: "x".to_string(),
            }])
            .await
            .unwrap();

        assert_eq!(
            engine.check_version("v2").await.unwrap(),
            VersionDecision::Changed
        );
        assert!(!engine.logged_in().await.unwrap());
        assert!(engine
            .cache
            .get(&ResourceId::new("frag-1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_check_version_same_version_is_noop() {
        let engine = test_engine();
        engine
            .sessions
            .save(&Session::new("alice", vec![], "t").with_version("v1"))
            .await
            .unwrap();

        assert_eq!(
            engine.check_version("v1").await.unwrap(),
            VersionDecision::Unchanged
        );
        assert!(engine.logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_in_role_without_session() {
        let engine = test_engine();
        assert!(!engine.in_role(&RoleName::new("editor")).await.unwrap());
    }

    #[test]
    fn test_logout_token_is_stable_within_a_day() {
        assert_eq!(logout_token("alice"), logout_token("alice"));
        assert_ne!(logout_token("alice"), logout_token("bob"));
    }
}
