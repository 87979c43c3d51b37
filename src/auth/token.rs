use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::UserEntity;
use crate::models::{TokenPair, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,             // 用户ID
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub typ: TokenKind,        // 令牌类型
    pub iat: i64,              // 签发时间
    pub exp: i64,              // 过期时间
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("token lifetime out of range")]
    Lifetime,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: u64,
}

impl KeyPair {
    fn new(secret: &str, lifetime: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs: lifetime.as_secs(),
        }
    }
}

/// 令牌签发与校验。无状态，可在请求间共享。
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenIssuer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            access: KeyPair::new(&config.jwt_secret, config.jwt_expiration()),
            refresh: KeyPair::new(&config.jwt_refresh_secret, config.jwt_refresh_expiration()),
            validation: strict_validation(),
        }
    }

    pub fn issue(&self, user: &UserEntity) -> Result<TokenPair, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &UserEntity, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(user, TokenKind::Access, now)?,
            refresh_token: self.sign(user, TokenKind::Refresh, now)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign(&self, user: &UserEntity, kind: TokenKind, now: DateTime<Utc>) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            typ: kind,
            iat: now.timestamp(),
            exp: expiry(now, keys.lifetime_secs)?.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(TokenError::Encode)
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!(?kind, "rejected expired token");
                    TokenError::Expired
                }
                other => {
                    tracing::warn!(?kind, error = ?other, "rejected malformed token");
                    TokenError::Malformed
                }
            })?
            .claims;

        if claims.typ != kind {
            tracing::warn!(expected = ?kind, actual = ?claims.typ, "token type mismatch");
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }
}

fn expiry(now: DateTime<Utc>, lifetime_secs: u64) -> Result<DateTime<Utc>, TokenError> {
    i64::try_from(lifetime_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or(TokenError::Lifetime)
}

fn strict_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // 过期即拒绝，不留宽限
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// 不校验签名，仅解析载荷并检查过期。客户端无法持有密钥，只能做结构性判断。
pub fn peek_access_claims(token: &str) -> Result<Claims, TokenError> {
    let mut validation = strict_validation();
    validation.insecure_disable_signature_validation();

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?
        .claims;

    if claims.typ != TokenKind::Access {
        return Err(TokenError::Malformed);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_user, test_config};

    fn issuer() -> TokenIssuer {
        TokenIssuer::from_config(&test_config())
    }

    #[test]
    fn fresh_access_token_verifies() {
        let issuer = issuer();
        let user = sample_user("daisy@farm.test", "daisy");
        let pair = issuer.issue(&user).unwrap();

        let claims = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "daisy");
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 7 * 86_400);
    }

    #[test]
    fn elapsed_access_token_is_expired() {
        let issuer = issuer();
        let user = sample_user("daisy@farm.test", "daisy");
        let issued = Utc::now() - Duration::days(7) - Duration::seconds(1);
        let pair = issuer.issue_at(&user, issued).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.access_token),
            Err(TokenError::Expired)
        ));
        // 刷新令牌寿命更长，仍然有效
        assert!(issuer.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let issuer = issuer();
        let pair = issuer.issue(&sample_user("a@farm.test", "a_user")).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn refresh_token_rejected_as_access_even_with_shared_secret() {
        let mut config = test_config();
        config.jwt_refresh_secret = config.jwt_secret.clone();
        let issuer = TokenIssuer::from_config(&config);
        let pair = issuer.issue(&sample_user("a@farm.test", "a_user")).unwrap();

        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn oversized_lifetime_fails_instead_of_overflowing() {
        let mut config = test_config();
        config.jwt_expiration_secs = 100_000_000_000 * 86_400;
        let issuer = TokenIssuer::from_config(&config);

        let result = issuer.issue(&sample_user("a@farm.test", "a_user"));
        assert!(matches!(result, Err(TokenError::Lifetime)));

        config.jwt_expiration_secs = u64::MAX;
        let issuer = TokenIssuer::from_config(&config);
        assert!(matches!(
            issuer.issue(&sample_user("a@farm.test", "a_user")),
            Err(TokenError::Lifetime)
        ));
    }

    #[test]
    fn garbage_and_foreign_signatures_are_malformed() {
        let issuer = issuer();
        assert!(matches!(issuer.verify_access("not-a-jwt"), Err(TokenError::Malformed)));

        let mut other = test_config();
        other.jwt_secret = "a-different-secret".into();
        let foreign = TokenIssuer::from_config(&other)
            .issue(&sample_user("a@farm.test", "a_user"))
            .unwrap();
        assert!(matches!(
            issuer.verify_access(&foreign.access_token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn peek_reads_unexpired_access_claims_without_secret() {
        let issuer = issuer();
        let user = sample_user("daisy@farm.test", "daisy");
        let pair = issuer.issue(&user).unwrap();
        assert_eq!(peek_access_claims(&pair.access_token).unwrap().sub, user.id);
        assert!(peek_access_claims(&pair.refresh_token).is_err());
        assert!(peek_access_claims("tampered").is_err());

        let stale = issuer
            .issue_at(&user, Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(
            peek_access_claims(&stale.access_token),
            Err(TokenError::Expired)
        ));
    }
}
