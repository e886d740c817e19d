use async_trait::async_trait;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AuthUser, AuthError>;
    async fn get_password_hash(&self, user_id: i32) -> Result<Option<String>, AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: username
        hashes: Mutex<HashMap<i32, String>>,     // key: user id
        next_id: Mutex<i32>,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(
            &self,
            username: &str,
        ) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(username).cloned())
        }

        async fn create_user(
            &self,
            username: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Err(AuthError::Conflict);
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let user = AuthUser {
                id: *next_id,
                username: username.to_string(),
                email: email.to_string(),
                role: models::user::ROLE_BASE.to_string(),
            };
            users.insert(username.to_string(), user.clone());
            self.hashes.lock().unwrap().insert(user.id, password_hash.to_string());
            Ok(user)
        }

        async fn get_password_hash(&self, user_id: i32) -> Result<Option<String>, AuthError> {
            Ok(self.hashes.lock().unwrap().get(&user_id).cloned())
        }
    }
}
