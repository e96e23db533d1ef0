//! Authorization gate
//!
//! Classifies a request credential into preview or standard tiers before any
//! other check runs. The gate itself never touches URL policy; an invalid
//! credential yields `Unauthorized` even for an otherwise-blocked URL.

use crate::{Result, SmolderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Fixed sentinel value granting the reduced-capability preview tier
pub const PREVIEW_TOKEN: &str = "this_is_just_a_preview_token";

/// A resolved standard-key account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Capability class of the key, e.g. "standard" or "scale"
    pub tier: String,

    /// Remaining credit balance; deduction bookkeeping happens outside
    /// this engine
    pub credits: i64,
}

/// The tier under which a request runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The fixed preview sentinel: scrapes and preview crawls only
    Preview,

    /// A key resolved by the [`AuthService`]
    Standard(Account),
}

impl Identity {
    pub fn is_preview(&self) -> bool {
        matches!(self, Identity::Preview)
    }

    /// Tier label used on job records and in logs
    pub fn tier_label(&self) -> &str {
        match self {
            Identity::Preview => "preview",
            Identity::Standard(account) => &account.tier,
        }
    }
}

/// Credential resolution backend
///
/// The engine treats key storage as opaque; only resolution success or
/// failure matters here.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves an API key to an account, or None when the key is unknown
    async fn resolve(&self, key: &str) -> Option<Account>;
}

/// Classifies a credential, enforcing the auth-before-policy ordering
///
/// * Missing credential → `Unauthorized`
/// * The preview sentinel → `Identity::Preview`
/// * Anything else → delegate to the [`AuthService`]; unresolved keys are
///   `Unauthorized`
pub async fn classify(auth: &dyn AuthService, credential: Option<&str>) -> Result<Identity> {
    let token = match credential {
        Some(t) if !t.trim().is_empty() => t.trim(),
        _ => return Err(SmolderError::Unauthorized),
    };

    if token == PREVIEW_TOKEN {
        return Ok(Identity::Preview);
    }

    match auth.resolve(token).await {
        Some(account) => Ok(Identity::Standard(account)),
        None => Err(SmolderError::Unauthorized),
    }
}

/// Key table backed by SHA-256 hashes
///
/// Keys are never stored in the clear; the config carries hex-encoded
/// digests and lookup hashes the presented key.
#[derive(Debug, Default)]
pub struct InMemoryAuthService {
    keys: HashMap<String, Account>,
}

impl InMemoryAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account under the digest of a plaintext key
    pub fn insert_key(&mut self, key: &str, account: Account) {
        self.keys.insert(hash_key(key), account);
    }

    /// Registers an account under an already-hashed key (hex digest)
    pub fn insert_hashed(&mut self, key_hash: String, account: Account) {
        self.keys.insert(key_hash.to_lowercase(), account);
    }
}

#[async_trait]
impl AuthService for InMemoryAuthService {
    async fn resolve(&self, key: &str) -> Option<Account> {
        self.keys.get(&hash_key(key)).cloned()
    }
}

/// Hex-encoded SHA-256 digest of an API key
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
