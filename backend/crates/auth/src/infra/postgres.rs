//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, UserDirectory};
use crate::domain::value_object::{
    refresh_token::RefreshTokenDigest, session_id::SessionId, social_identity::SocialIdentity,
    user_id::UserId, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_social_identity(&self, identity: &SocialIdentity) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.user_id, u.user_role, u.display_name, u.created_at, u.updated_at
            FROM users u
            JOIN user_social_accounts a ON a.user_id = u.user_id
            WHERE a.provider = $1 AND a.provider_subject = $2
            "#,
        )
        .bind(identity.provider.as_str())
        .bind(identity.subject.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// ============================================================================
// User Directory Implementation
// ============================================================================

impl UserDirectory for PgAuthRepository {
    async fn find_or_create_by_social_identity(
        &self,
        identity: &SocialIdentity,
    ) -> AuthResult<User> {
        if let Some(user) = self.find_by_social_identity(identity).await? {
            return Ok(user);
        }

        let user = User::new();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (user_id, user_role, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_role.code())
        .bind(&user.display_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        // Blocks behind a concurrent insert of the same identity, then no-ops
        let linked = sqlx::query(
            r#"
            INSERT INTO user_social_accounts (user_id, provider, provider_subject, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (provider, provider_subject) DO NOTHING
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(identity.provider.as_str())
        .bind(identity.subject.as_str())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if linked == 0 {
            tx.rollback().await?;
            tracing::debug!(
                provider = %identity.provider,
                "Social identity linked concurrently, using existing user"
            );
            return self
                .find_by_social_identity(identity)
                .await?
                .ok_or_else(|| AuthError::Internal("Social account vanished after conflict".into()));
        }

        tx.commit().await?;

        tracing::info!(
            user_id = %user.user_id,
            provider = %identity.provider,
            "User created from social identity"
        );

        Ok(user)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, user_role, display_name, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (
                session_id,
                user_id,
                refresh_token_hash,
                expires_at,
                created_at,
                revoked_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(&session.refresh_token_digest.as_bytes()[..])
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateRefreshToken
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_refresh_token(
        &self,
        digest: &RefreshTokenDigest,
    ) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                refresh_token_hash,
                expires_at,
                created_at,
                revoked_at
            FROM user_sessions
            WHERE refresh_token_hash = $1
            "#,
        )
        .bind(&digest.as_bytes()[..])
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn revoke(&self, session_id: &SessionId) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = COALESCE(revoked_at, $2)
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    async fn consume(&self, session_id: &SessionId) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = $2
            WHERE session_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn cleanup_spent(&self) -> AuthResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM user_sessions
            WHERE revoked_at IS NOT NULL AND expires_at < $1
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up spent refresh sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_role: String,
    display_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_role = UserRole::from_code(&self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_role,
            display_name: self.display_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Uuid,
    refresh_token_hash: Vec<u8>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        let refresh_token_digest = RefreshTokenDigest::try_from(self.refresh_token_hash)
            .map_err(|bytes| {
                AuthError::Internal(format!("Invalid refresh_token_hash length: {}", bytes.len()))
            })?;

        Ok(Session {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            refresh_token_digest,
            expires_at: self.expires_at,
            created_at: self.created_at,
            revoked_at: self.revoked_at,
        })
    }
}
