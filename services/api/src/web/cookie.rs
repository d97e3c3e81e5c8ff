//! services/api/src/web/cookie.rs
//!
//! Issues and verifies the `sid` cookie that carries a player's session id.
//! The value is `<id>.<hex hmac-sha256(id)>`, keyed by the session secret.

use axum::http::{header, HeaderMap};
use guessing_game_core::SessionId;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

use crate::error::ApiError;

pub const SESSION_COOKIE: &str = "sid";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
    max_age: Duration,
    secure: bool,
}

impl CookieSigner {
    pub fn new(secret: &str, max_age: Duration, secure: bool) -> Result<Self, ApiError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ApiError::Internal(format!("Invalid session secret: {}", e)))?;
        Ok(Self {
            mac,
            max_age,
            secure,
        })
    }

    /// Produces the signed cookie value for `id`.
    pub fn sign(&self, id: &SessionId) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_str().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{}.{}", id, signature)
    }

    /// Returns the id inside `value` if its signature checks out.
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(SessionId::from(id.to_string()))
    }

    /// Finds the first validly signed `sid` cookie among the request headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        let prefix = format!("{}=", SESSION_COOKIE);
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|c| c.trim().strip_prefix(prefix.as_str()))
            .find_map(|value| self.verify(value))
    }

    /// The `Set-Cookie` header value that hands `id` to the client.
    pub fn set_cookie(&self, id: &SessionId) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE,
            self.sign(id),
            self.max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signer() -> CookieSigner {
        CookieSigner::new("a-test-secret-of-decent-length", Duration::from_secs(90), false)
            .unwrap()
    }

    #[test]
    fn signed_value_verifies() {
        let signer = signer();
        let id = SessionId::generate();
        assert_eq!(signer.verify(&signer.sign(&id)), Some(id));
    }

    #[test]
    fn tampering_is_rejected() {
        let signer = signer();
        let id = SessionId::generate();
        let signed = signer.sign(&id);
        let (_, signature) = signed.rsplit_once('.').unwrap();

        assert_eq!(signer.verify(&format!("someone-else.{}", signature)), None);
        assert_eq!(signer.verify(id.as_str()), None);
        assert_eq!(signer.verify(&format!("{}.zz", id)), None);
        assert_eq!(signer.verify(&format!(".{}", signature)), None);

        let other = CookieSigner::new("a-different-secret-entirely", Duration::from_secs(90), false)
            .unwrap();
        assert_eq!(other.verify(&signed), None);
    }

    #[test]
    fn cookie_is_found_among_others() {
        let signer = signer();
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; sid={}; lang=en", signer.sign(&id)))
                .unwrap(),
        );
        assert_eq!(signer.read(&headers), Some(id));
        assert_eq!(signer.read(&HeaderMap::new()), None);
    }

    #[test]
    fn set_cookie_carries_attributes() {
        let id = SessionId::generate();
        let plain = signer().set_cookie(&id);
        assert!(plain.starts_with("sid="));
        assert!(plain.contains("HttpOnly"));
        assert!(plain.contains("Max-Age=90"));
        assert!(!plain.contains("Secure"));

        let secure = CookieSigner::new("a-test-secret-of-decent-length", Duration::from_secs(90), true)
            .unwrap()
            .set_cookie(&id);
        assert!(secure.ends_with("; Secure"));
    }
}
