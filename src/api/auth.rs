//! Bearer-token authorization against a Keycloak realm.
//!
//! Tokens are verified with the realm's published signing keys (or a local
//! HS256 secret) and must carry the required realm role.

use super::AppState;
use crate::config::AuthSettings;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Why a request was turned away.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Missing or invalid token (401).
    Unauthorized(String),
    /// Valid token without the required role (403).
    Forbidden(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
            AuthError::Forbidden(detail) => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

/// Claims read from a realm token.
#[derive(Debug, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    realm_access: RealmAccess,
}

impl Claims {
    pub fn roles(&self) -> &[String] {
        &self.realm_access.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.realm_access.roles.iter().any(|r| r == role)
    }
}

/// Validates bearer tokens and checks the required role.
pub struct Authenticator {
    settings: AuthSettings,
    http: reqwest::Client,
    keys: RwLock<Option<JwkSet>>,
}

impl Authenticator {
    pub fn new(settings: AuthSettings) -> Self {
        if settings.hs256_secret.is_some() {
            info!("Validating tokens with the configured HS256 secret");
        } else {
            info!("Validating tokens against {}", settings.jwks_url());
        }
        Self {
            settings,
            http: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    /// Verify `token` and require the configured realm role.
    pub async fn authorize(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token).await.map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::Unauthorized(format!("Invalid authentication credentials: {}", e))
        })?;

        if !claims.has_role(&self.settings.required_role) {
            return Err(AuthError::Forbidden(format!(
                "Forbidden: User does not have the required '{}' role.",
                self.settings.required_role
            )));
        }

        Ok(claims)
    }

    async fn verify(&self, token: &str) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| e.to_string())?;

        let (key, algorithm) = match &self.settings.hs256_secret {
            Some(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            None => {
                if matches!(header.alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
                    return Err(format!("Unsupported algorithm {:?}", header.alg));
                }
                let kid = header.kid.as_deref().ok_or("Token has no key id")?;
                (self.realm_key(kid).await?, header.alg)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[self.settings.issuer()]);
        if self.settings.verify_audience {
            validation.set_audience(&[self.settings.client_id.as_str()]);
        } else {
            validation.validate_aud = false;
        }

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| e.to_string())
    }

    /// Signing key for `kid`, refetching the key set once if it is unknown.
    async fn realm_key(&self, kid: &str) -> Result<DecodingKey, String> {
        if let Some(keys) = self.keys.read().await.as_ref() {
            if let Some(jwk) = keys.find(kid) {
                return DecodingKey::from_jwk(jwk).map_err(|e| e.to_string());
            }
        }

        let fetched = self.fetch_keys().await?;
        let key = fetched
            .find(kid)
            .ok_or_else(|| format!("Unknown signing key '{}'", kid))
            .and_then(|jwk| DecodingKey::from_jwk(jwk).map_err(|e| e.to_string()));
        *self.keys.write().await = Some(fetched);
        key
    }

    async fn fetch_keys(&self) -> Result<JwkSet, String> {
        let url = self.settings.jwks_url();
        debug!("Fetching signing keys from {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("Could not fetch signing keys: {}", e);
                format!("Could not fetch signing keys: {}", e)
            })?;
        response.json::<JwkSet>().await.map_err(|e| e.to_string())
    }
}

/// Middleware guarding routes behind the authenticator, when one is set.
pub async fn require_role(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth) = state.auth.as_ref() else {
        return next.run(request).await;
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return AuthError::Unauthorized("Not authenticated".to_string()).into_response();
    };

    match auth.authorize(token).await {
        Ok(claims) => {
            debug!(
                "Authorized {}",
                claims
                    .preferred_username
                    .as_deref()
                    .or(claims.sub.as_deref())
                    .unwrap_or("unknown")
            );
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub const SECRET: &str = "test-secret";

    pub fn settings() -> AuthSettings {
        AuthSettings {
            enabled: true,
            hs256_secret: Some(SECRET.to_string()),
            ..Default::default()
        }
    }

    /// Mint a token valid for an hour.
    pub fn token(issuer: &str, roles: &[&str]) -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let claims = json!({
            "sub": "user-1",
            "preferred_username": "ana",
            "iss": issuer,
            "aud": "account",
            "exp": exp,
            "realm_access": { "roles": roles },
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_with_role() {
        let settings = settings();
        let auth = Authenticator::new(settings.clone());
        let claims = auth
            .authorize(&token(&settings.issuer(), &["app-user", "offline_access"]))
            .await
            .unwrap();
        assert_eq!(claims.preferred_username.as_deref(), Some("ana"));
        assert!(claims.roles().contains(&"app-user".to_string()));
    }

    #[tokio::test]
    async fn test_missing_role_is_forbidden() {
        let settings = settings();
        let auth = Authenticator::new(settings.clone());
        let err = auth
            .authorize(&token(&settings.issuer(), &["offline_access"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(ref d) if d.contains("'app-user'")));
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_unauthorized() {
        let auth = Authenticator::new(settings());
        let err = auth
            .authorize(&token("http://evil.example/realms/x", &["app-user"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_audience_checked_when_enabled() {
        let settings = AuthSettings {
            verify_audience: true,
            ..settings()
        };
        let auth = Authenticator::new(settings.clone());
        let err = auth
            .authorize(&token(&settings.issuer(), &["app-user"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let auth = Authenticator::new(settings());
        let err = auth.authorize("not-a-jwt").await.unwrap_err();
        assert!(
            matches!(err, AuthError::Unauthorized(ref d) if d.starts_with("Invalid authentication credentials"))
        );
    }
}
