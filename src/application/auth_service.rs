// Auth service - Resolves a bearer token to an admin identity
use crate::application::telemetry_repository::AdminRepository;
use crate::domain::admin::Admin;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// The subject a verified token was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<TokenSubject, TokenError>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token missing")]
    MissingToken,
    #[error("Session expired. Please login again.")]
    TokenExpired,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Admin not found")]
    UserNotFound,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    /// Machine-readable code returned to clients, if any.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingToken => Some("NO_TOKEN"),
            AuthError::TokenExpired => Some("TOKEN_EXPIRED"),
            AuthError::InvalidToken => Some("INVALID_TOKEN"),
            AuthError::UserNotFound => Some("USER_NOT_FOUND"),
            AuthError::Internal(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    verifier: Arc<dyn TokenVerifier>,
    admins: Arc<dyn AdminRepository>,
}

impl AuthService {
    pub fn new(verifier: Arc<dyn TokenVerifier>, admins: Arc<dyn AdminRepository>) -> Self {
        Self { verifier, admins }
    }

    /// Authenticate the raw `Authorization` header value.
    ///
    /// A `Bearer ` prefix is optional; without it the whole header is the token.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Admin, AuthError> {
        let header = authorization
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        let subject = self.verifier.verify(token).await.map_err(|e| {
            tracing::warn!("Rejected admin token: {}", e);
            match e {
                TokenError::Expired => AuthError::TokenExpired,
                TokenError::Invalid(_) => AuthError::InvalidToken,
            }
        })?;

        match self.admins.find_by_username(&subject.user_id).await {
            Ok(Some(admin)) => Ok(admin),
            Ok(None) => {
                tracing::warn!("Token subject {} has no admin record", subject.user_id);
                Err(AuthError::UserNotFound)
            }
            Err(e) => {
                tracing::error!("Admin lookup failed: {:#}", e);
                Err(AuthError::Internal(e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::collections::HashMap;

    /// Maps literal tokens to outcomes.
    #[derive(Default)]
    pub struct TableVerifier {
        pub tokens: HashMap<String, Result<TokenSubject, TokenError>>,
    }

    impl TableVerifier {
        pub fn accept(mut self, token: &str, user_id: &str) -> Self {
            self.tokens.insert(
                token.to_string(),
                Ok(TokenSubject {
                    user_id: user_id.to_string(),
                }),
            );
            self
        }

        pub fn expire(mut self, token: &str) -> Self {
            self.tokens.insert(token.to_string(), Err(TokenError::Expired));
            self
        }
    }

    #[async_trait]
    impl TokenVerifier for TableVerifier {
        async fn verify(&self, token: &str) -> Result<TokenSubject, TokenError> {
            self.tokens
                .get(token)
                .cloned()
                .unwrap_or_else(|| Err(TokenError::Invalid("unknown token".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::TableVerifier;
    use super::*;
    use crate::application::telemetry_repository::fakes::InMemoryRepository;

    fn service(fail_store: bool) -> AuthService {
        let verifier = TableVerifier::default()
            .accept("good", "root")
            .accept("orphan", "ghost")
            .expire("old");
        let admins = InMemoryRepository {
            admins: vec![Admin {
                id: 1,
                username: "root".to_string(),
            }],
            fail: fail_store,
            ..Default::default()
        };
        AuthService::new(Arc::new(verifier), Arc::new(admins))
    }

    #[tokio::test]
    async fn test_bearer_and_raw_tokens_resolve_admin() {
        let service = service(false);

        let admin = service.authenticate(Some("Bearer good")).await.unwrap();
        assert_eq!(admin.username, "root");

        let admin = service.authenticate(Some("good")).await.unwrap();
        assert_eq!(admin.id, 1);
    }

    #[tokio::test]
    async fn test_failure_kinds_map_to_codes() {
        let service = service(false);

        let cases = [
            (None, "NO_TOKEN"),
            (Some(""), "NO_TOKEN"),
            (Some("Bearer old"), "TOKEN_EXPIRED"),
            (Some("Bearer forged"), "INVALID_TOKEN"),
            (Some("Bearer orphan"), "USER_NOT_FOUND"),
        ];
        for (header, code) in cases {
            let err = service.authenticate(header).await.unwrap_err();
            assert_eq!(err.code(), Some(code), "header {:?}", header);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let err = service(true).authenticate(Some("Bearer good")).await.unwrap_err();

        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.code(), None);
    }
}
