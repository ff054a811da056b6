//! Postgres-backed account store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Connection, PgPool};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{AccountField, AccountStore, AccountStoreError, Identity};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SELECT_IDENTITY: &str =
    "SELECT email, username, password_hash, is_admin, locale, online, last_seen FROM users";

#[derive(Clone, Debug)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and make sure the `users` table exists.
    ///
    /// # Errors
    /// Returns an error if the connection or the schema setup fails.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        let store = Self::new(pool);
        store.apply_schema().await?;

        Ok(store)
    }

    async fn apply_schema(&self) -> Result<()> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .context("failed to acquire connection for schema setup")?;

        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&mut *connection)
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        info!("Account schema ready");

        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AccountStoreError> {
        let query = format!("{SELECT_IDENTITY} WHERE lower(email) = lower($1) LIMIT 1");
        let identity = sqlx::query_as::<_, Identity>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Identity>, AccountStoreError> {
        let query = format!("{SELECT_IDENTITY} WHERE lower(username) = lower($1) LIMIT 1");
        let identity = sqlx::query_as::<_, Identity>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn find_by_email_or_username(
        &self,
        field: &str,
    ) -> Result<Option<Identity>, AccountStoreError> {
        let query = format!(
            "{SELECT_IDENTITY} WHERE lower(username) = lower($1) OR lower(email) = lower($1) LIMIT 1"
        );
        let identity = sqlx::query_as::<_, Identity>(&query)
            .bind(field)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn insert(&self, identity: &Identity) -> Result<(), AccountStoreError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (email, username, password_hash, is_admin, locale, online, last_seen)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&identity.email)
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(identity.is_admin)
        .bind(&identity.locale)
        .bind(identity.online)
        .bind(identity.last_seen)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Created user {}", identity.username);
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                Err(AccountStoreError::Duplicate(duplicate_field(&err)))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update(&self, identity: &Identity) -> Result<(), AccountStoreError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $2, password_hash = $3, is_admin = $4, locale = $5, online = $6, last_seen = $7
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(&identity.email)
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(identity.is_admin)
        .bind(&identity.locale)
        .bind(identity.online)
        .bind(identity.last_seen)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            error!("Failed to update user {}: {err}", identity.email);
            err
        })?;

        if result.rows_affected() == 0 {
            return Err(AccountStoreError::NotFound(identity.email.clone()));
        }

        debug!("Updated user {}", identity.email);

        Ok(())
    }

    async fn ping(&self) -> Result<(), AccountStoreError> {
        let mut connection = self.pool.acquire().await?;
        connection.ping().await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Which unique index rejected the insert.
fn duplicate_field(err: &sqlx::Error) -> AccountField {
    match err {
        sqlx::Error::Database(db_err)
            if db_err
                .constraint()
                .is_some_and(|name| name.contains("username")) =>
        {
            AccountField::Username
        }
        _ => AccountField::Email,
    }
}

/// Split the schema file into statements terminated by `;`.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn schema_splits_into_statements() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS users"));
        assert!(statements.iter().all(|statement| statement.ends_with(';')));
    }

    #[test]
    fn split_skips_comments_and_keeps_trailing_statement() {
        let sql = "-- comment\nSELECT 1;\nSELECT 2";
        assert_eq!(
            split_sql_statements(sql),
            vec!["SELECT 1;".to_string(), "SELECT 2".to_string()]
        );
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
