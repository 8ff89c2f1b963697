use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::auth::password;
use crate::config::BootstrapAdminConfig;

/// Creates the default administrator when no administrator exists yet.
/// Runs once at startup, before the listener binds, so the existence check
/// needs no locking.
pub async fn ensure_default_admin(db: &PgPool, admin: &BootstrapAdminConfig) -> anyhow::Result<()> {
    let has_admin =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE admin = TRUE)")
            .fetch_one(db)
            .await?;
    if has_admin {
        return Ok(());
    }

    let hash = password::hash_password(&admin.password)?;
    let result = sqlx::query(
        "INSERT INTO users \
         (guid, login, password_hash, name, gender, birthday, admin, created_on, created_by) \
         VALUES ($1, $2, $3, $4, $5, NULL, TRUE, $6, 'bootstrap')",
    )
    .bind(Uuid::new_v4())
    .bind(&admin.login)
    .bind(&hash)
    .bind(&admin.name)
    .bind(admin.gender)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("default administrator was not created");
    }

    info!(login = %admin.login, "default administrator created");
    Ok(())
}
