// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, UpdateProfilePayload},
};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Usado pelo middleware de auth, antes de existir uma sessão/conexão RLS
    pub async fn find_for_session(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        self.find_by_id(&self.pool, id).await
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(profile)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles ORDER BY last_name ASC NULLS LAST, first_name ASC NULLS LAST",
        )
        .fetch_all(executor)
        .await?;

        Ok(profiles)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET role = COALESCE($2, role),
                is_active = COALESCE($3, is_active),
                agent_commission_percentage = COALESCE($4, agent_commission_percentage),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.role)
        .bind(input.is_active)
        .bind(input.agent_commission_percentage)
        .fetch_optional(executor)
        .await?;

        Ok(profile)
    }
}
