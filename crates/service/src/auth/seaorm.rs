use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::domain::AuthUser;
use super::errors::AuthError;
use super::repository::AuthRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn auth_user(model: models::user::Model) -> AuthUser {
    AuthUser {
        id: model.id,
        username: model.username,
        email: model.email,
        role: model.role,
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let found = models::user::Entity::find()
            .filter(models::user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(auth_user))
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, username, email, password_hash)
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
                models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
            })?;
        Ok(auth_user(created))
    }

    async fn get_password_hash(&self, user_id: i32) -> Result<Option<String>, AuthError> {
        let found = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(|u| u.password_hash))
    }
}
