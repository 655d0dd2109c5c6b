// src/common/db_utils.rs

use sqlx::{pool::PoolConnection, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::profile::Session};

/// Adquire uma conexão da pool e grava a sessão nas variáveis que as
/// políticas de row-level security leem (`app.user_id`, `app.user_role`).
pub(crate) async fn get_rls_connection(
    pool: &PgPool,
    session: &Session,
) -> Result<PoolConnection<Postgres>, AppError> {
    let mut conn = pool.acquire().await?;

    // `false` = vale para a sessão inteira da conexão, inclusive nas transações
    // abertas sobre ela. O after_release da pool limpa os dois valores.
    sqlx::query("SELECT set_config('app.user_id', $1, false), set_config('app.user_role', $2, false)")
        .bind(session.profile_id.to_string())
        .bind(session.role.as_str())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}

/// Substitui o conjunto de vínculos N:N de um registro por `ids`.
///
/// Remove os vínculos que saíram e insere os novos numa única instrução.
/// `table`, `owner_column` e `target_column` são sempre constantes do código.
pub(crate) async fn replace_links<'e, E>(
    executor: E,
    table: &'static str,
    owner_column: &'static str,
    target_column: &'static str,
    owner_id: Uuid,
    ids: &[Uuid],
    target_label: &str,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        WITH removed AS (
            DELETE FROM {table}
            WHERE {owner_column} = $1 AND NOT ({target_column} = ANY($2::uuid[]))
        )
        INSERT INTO {table} ({owner_column}, {target_column})
        SELECT $1, unnest($2::uuid[])
        ON CONFLICT DO NOTHING
        "#
    );

    sqlx::query(&sql)
        .bind(owner_id)
        .bind(ids)
        .execute(executor)
        .await
        .map_err(|e| {
            // Vínculo para um id que não existe
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(target_label.to_string());
                }
            }
            e.into()
        })?;

    Ok(())
}
