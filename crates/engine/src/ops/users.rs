use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, sessions, users,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a new user.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<User> {
        let username = normalize_required_name(username, "user")?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
                display_name: ActiveValue::Set(normalize_optional_text(display_name)),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let model = model.insert(&db_tx).await?;
            Ok(User::from(model))
        })
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Checks a username/password pair.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::Unauthorized("missing credentials".to_string()));
        }

        users::Entity::find_by_id(username.to_string())
            .filter(users::Column::Password.eq(password.to_string()))
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::Unauthorized("invalid credentials".to_string()))
    }

    /// Opens a session and returns its token.
    pub async fn sign_in(&self, username: &str, password: &str) -> ResultEngine<String> {
        let user = self.authenticate(username, password).await?;
        let token = Uuid::new_v4().simple().to_string();

        let model = sessions::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            username: ActiveValue::Set(user.username.clone()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(username = %user.username, "signed in");
        Ok(token)
    }

    /// Resolves a session token to its user.
    pub async fn identity(&self, token: &str) -> ResultEngine<User> {
        let session = sessions::Entity::find_by_id(token.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("invalid session".to_string()))?;

        users::Entity::find_by_id(session.username)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::Unauthorized("invalid session".to_string()))
    }

    /// Ends a session. Unknown tokens are rejected.
    pub async fn sign_out(&self, token: &str) -> ResultEngine<()> {
        let result = sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Unauthorized("invalid session".to_string()));
        }
        Ok(())
    }
}
