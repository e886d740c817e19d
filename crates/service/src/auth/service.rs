use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_hours: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_hours: 12 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new base user with a hashed password.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if !input.email.contains('@') {
            return Err(AuthError::Validation("invalid email".into()));
        }
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(&input.username, &input.email, &hash).await?;
        info!(user_id = user.id, username = %user.username, event = "user_registered", "user registered");
        Ok(user)
    }

    /// Authenticate a user and issue a signed token.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let hash = self
            .repo
            .get_password_hash(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_hours)).timestamp()
            as usize;
        let claims = Claims {
            sub: user.username.clone(),
            uid: user.id,
            role: user.role.clone(),
            exp,
        };
        let token = encode(
            &JwtHeader::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenError(e.to_string()))?;

        Ok(AuthSession { user, token: Some(token) })
    }
}

/// Verify a bearer token and return its claims. Pure; used by the transport
/// to resolve the caller's verified identity.
pub fn decode_token(jwt_secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("test-secret"))
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let svc = svc();
        let user = svc
            .register(RegisterInput {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password: "Secret123".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.role, models::user::ROLE_BASE);

        let session = svc
            .login(LoginInput { username: "bob".into(), password: "Secret123".into() })
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);

        let claims = decode_token("test-secret", session.token.as_deref().unwrap()).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.sub, "bob");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = svc();
        svc.register(RegisterInput {
            username: "eve".into(),
            email: "eve@example.com".into(),
            password: "Secret123".into(),
        })
        .await
        .unwrap();

        let err = svc
            .login(LoginInput { username: "eve".into(), password: "WrongPass1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let svc = svc();
        let input = RegisterInput {
            username: "dup".into(),
            email: "dup@example.com".into(),
            password: "Secret123".into(),
        };
        svc.register(input.clone()).await.unwrap();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[test]
    fn tampered_token_rejected() {
        let err = decode_token("test-secret", "not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::TokenError(_)));
    }
}
