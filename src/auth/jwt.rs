use jsonwebtoken::{
    decode, decode_header, errors::ErrorKind, jwk::JwkSet, Algorithm, DecodingKey, Validation,
};
use tracing::{debug, warn};

use super::{claims::Claims, error::AuthError};
use crate::config::{AuthConfig, KeySourceConfig};

enum KeySource {
    /// RS256 keys looked up by `kid` in the provider's JWKS document.
    Jwks {
        url: String,
        issuer: String,
        http: reqwest::Client,
    },
    /// HS256 shared secret.
    Secret { key: DecodingKey, issuer: String },
}

/// Verifies bearer tokens and hands back their claims.
pub struct TokenValidator {
    audience: String,
    source: KeySource,
}

impl TokenValidator {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        let source = match &cfg.keys {
            KeySourceConfig::Jwks { domain } => KeySource::Jwks {
                url: format!("https://{domain}/.well-known/jwks.json"),
                issuer: format!("https://{domain}/"),
                http: reqwest::Client::new(),
            },
            KeySourceConfig::Secret { secret, issuer } => KeySource::Secret {
                key: DecodingKey::from_secret(secret.as_bytes()),
                issuer: issuer.clone(),
            },
        };
        Self {
            audience: cfg.audience.clone(),
            source,
        }
    }

    /// JWKS source with an explicit document URL, for pointing at a local key server.
    #[cfg(test)]
    pub(crate) fn with_jwks_url(audience: &str, url: String, issuer: String) -> Self {
        Self {
            audience: audience.into(),
            source: KeySource::Jwks {
                url,
                issuer,
                http: reqwest::Client::builder()
                    .no_proxy()
                    .build()
                    .expect("build test http client"),
            },
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::malformed())?;

        let (key, algorithm, issuer) = match &self.source {
            KeySource::Jwks { url, issuer, http } => {
                let kid = header.kid.ok_or_else(AuthError::malformed)?;
                let jwks = fetch_jwks(http, url).await?;
                (key_for(&jwks, &kid)?, Algorithm::RS256, issuer)
            }
            KeySource::Secret { key, issuer } => (key.clone(), Algorithm::HS256, issuer),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(issuer));
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::expired(),
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::MissingRequiredClaim(_) => AuthError::bad_claims(),
            _ => {
                debug!(error = %e, "token rejected");
                AuthError::unparseable()
            }
        })?;
        debug!(sub = ?data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Picks the signing key named by the token header out of the key set.
fn key_for(jwks: &JwkSet, kid: &str) -> Result<DecodingKey, AuthError> {
    let jwk = jwks.find(kid).ok_or_else(|| {
        warn!(%kid, "no matching key in jwks");
        AuthError::key_not_found()
    })?;
    DecodingKey::from_jwk(jwk).map_err(|e| {
        warn!(%kid, error = %e, "unusable jwk");
        AuthError::key_not_found()
    })
}

async fn fetch_jwks(http: &reqwest::Client, url: &str) -> Result<JwkSet, AuthError> {
    let fetched = async {
        http.get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await
    }
    .await;
    fetched.map_err(|e| {
        warn!(error = %e, %url, "jwks fetch failed");
        AuthError::key_not_found()
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::auth::claims::Audience;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn validator() -> TokenValidator {
        TokenValidator::from_config(&auth_config())
    }

    #[tokio::test]
    async fn verifies_a_valid_token() {
        let token = token_with(&["post:drinks"]);
        let claims = validator().verify(&token).await.expect("verify token");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.permissions, Some(vec!["post:drinks".to_string()]));
    }

    #[tokio::test]
    async fn accepts_audience_lists() {
        let mut c = claims(&[]);
        c.aud = Audience::Many(vec!["other".into(), AUDIENCE.into()]);
        assert!(validator().verify(&sign(&c)).await.is_ok());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let err = validator().verify(&expired_token(&[])).await.unwrap_err();
        assert_eq!(err, AuthError::expired());
    }

    #[tokio::test]
    async fn wrong_audience_or_issuer_is_invalid_claims() {
        let mut c = claims(&[]);
        c.aud = Audience::One("someone-else".into());
        assert_eq!(validator().verify(&sign(&c)).await.unwrap_err(), AuthError::bad_claims());

        let mut c = claims(&[]);
        c.iss = "https://evil.example/".into();
        assert_eq!(validator().verify(&sign(&c)).await.unwrap_err(), AuthError::bad_claims());
    }

    #[tokio::test]
    async fn bad_signature_is_unparseable() {
        let token = encode(
            &Header::default(),
            &claims(&[]),
            &EncodingKey::from_secret(b"not-the-secret"),
        )
        .unwrap();
        let err = validator().verify(&token).await.unwrap_err();
        assert_eq!(err, AuthError::unparseable());
        assert_eq!(err.status.as_u16(), 400);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let err = validator().verify("not-a-jwt").await.unwrap_err();
        assert_eq!(err, AuthError::malformed());
    }

    #[tokio::test]
    async fn jwks_source_requires_kid() {
        let cfg = AuthConfig {
            audience: AUDIENCE.into(),
            keys: KeySourceConfig::Jwks {
                domain: "tenant.example".into(),
            },
        };
        // HS256 test tokens carry no kid, so this fails before any network call.
        let err = TokenValidator::from_config(&cfg)
            .verify(&token_with(&[]))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::malformed());
    }

    #[test]
    fn key_lookup_by_kid() {
        let jwks: JwkSet = serde_json::from_str(JWKS).unwrap();
        assert!(key_for(&jwks, RSA_KID).is_ok());

        let err = key_for(&jwks, "rotated-away").err().unwrap();
        assert_eq!(err, AuthError::key_not_found());
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.description, "Unable to find the appropriate key.");
    }

    /// Serves `JWKS` at the well-known path on an ephemeral port.
    async fn key_server() -> std::net::SocketAddr {
        use axum::{http::header, routing::get, Router};

        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], JWKS) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    fn jwks_validator(addr: std::net::SocketAddr, path: &str) -> (TokenValidator, String) {
        let issuer = format!("http://{addr}/");
        let validator =
            TokenValidator::with_jwks_url(AUDIENCE, format!("http://{addr}{path}"), issuer.clone());
        (validator, issuer)
    }

    #[tokio::test]
    async fn verifies_rs256_token_against_served_jwks() {
        let addr = key_server().await;
        let (validator, issuer) = jwks_validator(addr, "/.well-known/jwks.json");

        let mut c = claims(&["get:drinks-detail"]);
        c.iss = issuer;
        let verified = validator.verify(&sign_rs256(&c, RSA_KID)).await.unwrap();
        assert_eq!(verified.permissions, Some(vec!["get:drinks-detail".to_string()]));
    }

    #[tokio::test]
    async fn unknown_kid_is_key_not_found() {
        let addr = key_server().await;
        let (validator, issuer) = jwks_validator(addr, "/.well-known/jwks.json");

        let mut c = claims(&[]);
        c.iss = issuer;
        let err = validator.verify(&sign_rs256(&c, "rotated-away")).await.unwrap_err();
        assert_eq!(err, AuthError::key_not_found());
    }

    #[tokio::test]
    async fn jwks_fetch_failure_is_key_not_found() {
        let addr = key_server().await;
        let (validator, issuer) = jwks_validator(addr, "/missing.json");
        let mut c = claims(&[]);
        c.iss = issuer;
        let token = sign_rs256(&c, RSA_KID);
        assert_eq!(validator.verify(&token).await.unwrap_err(), AuthError::key_not_found());

        // Nothing listening at all.
        let closed = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let (validator, _) = jwks_validator(closed, "/.well-known/jwks.json");
        assert_eq!(validator.verify(&token).await.unwrap_err(), AuthError::key_not_found());
    }
}
