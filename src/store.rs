//! Local session store
//!
//! Keeps the access/refresh token pair and the logged-in user between CLI
//! invocations. Clearing it is the equivalent of logging out.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::User;

/// Tokens issued by `/auth/login` and rotated by `/auth/refresh`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// A persisted login
#[derive(Debug, Clone)]
pub struct Session {
    pub tokens: Tokens,
    pub user: Option<User>,
    pub updated_at: DateTime<Utc>,
}

/// Database-backed session store
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    access_token: String,
    refresh_token: String,
    user_json: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = crate::error::AppError;

    fn try_from(row: SessionRow) -> Result<Self> {
        let user = row
            .user_json
            .map(|json| serde_json::from_str(&json))
            .transpose()?;

        Ok(Session {
            tokens: Tokens {
                access_token: row.access_token,
                refresh_token: row.refresh_token,
            },
            user,
            updated_at: row.updated_at,
        })
    }
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `database_url` and run migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT access_token, refresh_token, user_json, updated_at
            FROM session
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    pub async fn tokens(&self) -> Result<Option<Tokens>> {
        Ok(self.load().await?.map(|s| s.tokens))
    }

    /// Replace the stored session
    pub async fn save(&self, tokens: &Tokens, user: Option<&User>) -> Result<()> {
        let user_json = user.map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO session (id, access_token, refresh_token, user_json, updated_at)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                user_json = excluded.user_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(user_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Rotate tokens, keeping the stored user
    pub async fn update_tokens(&self, tokens: &Tokens) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE session
            SET access_token = ?, refresh_token = ?, updated_at = ?
            WHERE id = 1
            "#,
        )
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::status::UserRole;

    async fn setup_test_store() -> SessionStore {
        SessionStore::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory store")
    }

    fn tokens(access: &str, refresh: &str) -> Tokens {
        Tokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    fn moderator() -> User {
        User {
            id: 3,
            name: "Caio".to_string(),
            email: "caio@example.org".to_string(),
            role: UserRole::Moderator,
            institution_id: None,
            region_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_load_empty() {
        let store = setup_test_store().await;
        assert!(store.load().await.unwrap().is_none());
        assert!(store.tokens().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = setup_test_store().await;
        store
            .save(&tokens("a1", "r1"), Some(&moderator()))
            .await
            .unwrap();

        let session = store.load().await.unwrap().unwrap();
        assert_eq!(session.tokens, tokens("a1", "r1"));
        let user = session.user.unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.role, UserRole::Moderator);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = setup_test_store().await;
        store.save(&tokens("a1", "r1"), None).await.unwrap();
        store
            .save(&tokens("a2", "r2"), Some(&moderator()))
            .await
            .unwrap();

        let session = store.load().await.unwrap().unwrap();
        assert_eq!(session.tokens, tokens("a2", "r2"));
        assert!(session.user.is_some());
    }

    #[tokio::test]
    async fn test_update_tokens_keeps_user() {
        let store = setup_test_store().await;
        store
            .save(&tokens("a1", "r1"), Some(&moderator()))
            .await
            .unwrap();
        store.update_tokens(&tokens("a2", "r2")).await.unwrap();

        let session = store.load().await.unwrap().unwrap();
        assert_eq!(session.tokens, tokens("a2", "r2"));
        assert_eq!(session.user.unwrap().name, "Caio");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = setup_test_store().await;
        store.save(&tokens("a1", "r1"), None).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
