//! # Admin Session
//!
//! A signed, expiring session flag plus the path gate in front of `/admin/*`.
//!
//! Token format: `v1.<expires_unix>.<hex hmac-sha256>` where the tag covers
//! `v1.<expires_unix>`. There are no server-side sessions; logout only clears
//! the cookie.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{MediSeekError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "admin-session";

/// One week
pub const DEFAULT_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

const ADMIN_PREFIX: &str = "/admin/";
const TOKEN_VERSION: &str = "v1";

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
    max_age_secs: u64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>, max_age_secs: u64) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_ref()).map_err(|e| MediSeekError::Config {
            reason: format!("invalid session secret: {}", e),
        })?;
        Ok(Self { mac, max_age_secs })
    }

    /// Signer with a fresh random secret (tokens die with the process)
    pub fn random(max_age_secs: u64) -> Result<Self> {
        Self::new(generate_secret()?, max_age_secs)
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    pub fn issue(&self) -> String {
        self.issue_at(unix_now())
    }

    pub fn issue_at(&self, now_unix: u64) -> String {
        let payload = format!("{}.{}", TOKEN_VERSION, now_unix.saturating_add(self.max_age_secs));
        let tag = to_hex(&self.tag(&payload));
        format!("{}.{}", payload, tag)
    }

    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, unix_now())
    }

    /// Format, signature (constant time) and expiry
    pub fn verify_at(&self, token: &str, now_unix: u64) -> bool {
        let Some((payload, tag_hex)) = token.trim().rsplit_once('.') else {
            return false;
        };
        let Some((version, expires)) = payload.split_once('.') else {
            return false;
        };
        if version != TOKEN_VERSION {
            return false;
        }
        let Ok(expires) = expires.parse::<u64>() else {
            return false;
        };
        let Some(tag) = from_hex(tag_hex) else {
            return false;
        };

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        if mac.verify_slice(&tag).is_err() {
            return false;
        }

        now_unix < expires
    }

    /// `Set-Cookie` value for a fresh token
    pub fn cookie_header(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, token, self.max_age_secs
        )
    }

    fn tag(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// 32 random bytes, hex encoded, for `[admin].session_secret`
pub fn generate_secret() -> Result<String> {
    let mut secret = [0u8; 32];
    getrandom::getrandom(&mut secret).map_err(|e| MediSeekError::Config {
        reason: format!("could not generate session secret: {}", e),
    })?;
    Ok(to_hex(&secret))
}

/// `Set-Cookie` value that deletes the session
pub fn clear_cookie_header() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Outcome of the admin path gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(String),
}

/// Path gate for the admin area
pub struct AdminGate<'a> {
    signer: &'a SessionSigner,
}

impl<'a> AdminGate<'a> {
    pub fn new(signer: &'a SessionSigner) -> Self {
        Self { signer }
    }

    /// Decide what a request for `path` carrying `cookie` may do
    pub fn check(&self, path: &str, cookie: Option<&str>) -> GateDecision {
        let authenticated = cookie.is_some_and(|token| self.signer.verify(token));

        if path.starts_with(LOGIN_PATH) {
            return if authenticated {
                GateDecision::Redirect(DASHBOARD_PATH.to_string())
            } else {
                GateDecision::Continue
            };
        }

        if path.starts_with(ADMIN_PREFIX) && !authenticated {
            tracing::debug!(path = %path, "Admin path without session");
            return GateDecision::Redirect(login_redirect(path));
        }

        GateDecision::Continue
    }
}

/// `/admin/login?from=<path>`
pub fn login_redirect(from: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{}?from={}", LOGIN_PATH, encoded)
}

/// Where to go after a successful login
///
/// Only admin paths other than the login page are honoured, which keeps the
/// redirect on this site.
pub fn post_login_redirect(from: Option<&str>) -> String {
    match from.map(str::trim) {
        Some(path)
            if path.starts_with(ADMIN_PREFIX)
                && !path.starts_with(LOGIN_PATH)
                && !path.contains("//")
                && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
