//! User data access.

use crate::db::Database;
use crate::error::{Result, StaffdeskError};
use crate::models::{User, UserUpdate};
use sqlx::AnyPool;
use tracing::instrument;

/// Queries and mutations over the `users` table.
#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: AnyPool,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name, email)| User { name, email })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn add(&self, name: &str, email: &str) -> Result<()> {
        sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(name.to_string())
            .bind(email.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Exact name match. Returns the first user when names repeat.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT name, email FROM users WHERE name = ? ORDER BY id LIMIT 1")
                .bind(name.to_string())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(name, email)| User { name, email }))
    }

    /// Rename and/or re-address every user called `name`.
    #[instrument(skip(self))]
    pub async fn update(&self, name: &str, changes: &UserUpdate) -> Result<u64> {
        let assignments = changes.assignments();
        if assignments.is_empty() {
            return Err(StaffdeskError::InvalidInput(
                "You must provide a new name or a new email to update".to_string(),
            ));
        }

        let set_clause = assignments
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE users SET {} WHERE name = ?", set_clause);

        let mut query = sqlx::query(&sql);
        for (_, value) in assignments {
            query = query.bind(value);
        }
        let result = query.bind(name.to_string()).execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE name = ?")
            .bind(name.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(&db)
    }

    #[tokio::test]
    async fn test_add_list_and_get() {
        let repo = repo().await;
        repo.add("Ana", "ana@example.com").await.unwrap();
        repo.add("Bruno", "bruno@example.com").await.unwrap();

        let users = repo.list_all().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Ana");

        let bruno = repo.get_by_name("Bruno").await.unwrap().unwrap();
        assert_eq!(bruno.email, "bruno@example.com");
        assert!(repo.get_by_name("Bru").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_on_update_leaves_row_unchanged() {
        let repo = repo().await;
        repo.add("Ana", "ana@example.com").await.unwrap();
        repo.add("Bruno", "bruno@example.com").await.unwrap();

        let changes = UserUpdate {
            new_name: Some("Bruna".to_string()),
            new_email: Some("ana@example.com".to_string()),
        };
        let err = repo.update("Bruno", &changes).await.unwrap_err();
        assert!(matches!(err, StaffdeskError::Constraint(_)), "got {:?}", err);

        let bruno = repo.get_by_name("Bruno").await.unwrap().unwrap();
        assert_eq!(bruno.email, "bruno@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_on_add() {
        let repo = repo().await;
        repo.add("Ana", "ana@example.com").await.unwrap();

        let err = repo.add("Other Ana", "ana@example.com").await.unwrap_err();
        assert!(matches!(err, StaffdeskError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let repo = repo().await;
        repo.add("Ana", "ana@example.com").await.unwrap();

        let changes = UserUpdate {
            new_name: Some(String::new()),
            new_email: None,
        };
        let err = repo.update("Ana", &changes).await.unwrap_err();
        assert!(matches!(err, StaffdeskError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_row_counts() {
        let repo = repo().await;
        repo.add("Ana", "ana@example.com").await.unwrap();

        let changes = UserUpdate {
            new_email: Some("ana@new.io".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.update("Ana", &changes).await.unwrap(), 1);
        assert_eq!(repo.update("Nobody", &changes).await.unwrap(), 0);
        assert_eq!(repo.delete("Nobody").await.unwrap(), 0);
        assert_eq!(repo.delete("Ana").await.unwrap(), 1);
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
