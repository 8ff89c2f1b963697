use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::accounts::dto::{RegistrationRequest, ShortUser, UpdateUserRequest};
use crate::auth::password;

/// User record in the database. `revoked_on IS NULL` defines an active user;
/// `modified_on IS NULL` means the record was never changed after creation.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub guid: Uuid,
    pub login: String,
    pub password_hash: String,
    pub name: String,
    pub gender: i32,
    pub birthday: Option<Date>,
    pub admin: bool,
    pub created_on: OffsetDateTime,
    pub created_by: String,
    pub modified_on: Option<OffsetDateTime>,
    pub modified_by: Option<String>,
    pub revoked_on: Option<OffsetDateTime>,
    pub revoked_by: Option<String>,
}

/// The minimal tuple needed to issue a token.
#[derive(Debug, Clone, FromRow)]
pub struct ClaimsData {
    pub login: String,
    pub admin: bool,
}

const USER_COLUMNS: &str = "guid, login, password_hash, name, gender, birthday, admin, \
     created_on, created_by, modified_on, modified_by, revoked_on, revoked_by";

impl User {
    pub async fn exists_by_login(db: &PgPool, login: &str) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)",
        )
        .bind(login)
        .fetch_one(db)
        .await?;
        Ok(exists)
    }

    /// Errors if the login is absent. Callers check existence first.
    pub async fn is_active(db: &PgPool, login: &str) -> anyhow::Result<bool> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT revoked_on IS NULL FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_one(db)
        .await?;
        Ok(active)
    }

    /// Errors if the login is absent; `None` when the password does not match.
    pub async fn verify_credentials(
        db: &PgPool,
        login: &str,
        plain: &str,
    ) -> anyhow::Result<Option<ClaimsData>> {
        let user = Self::get_by_login(db, login).await?;
        if password::verify_password(plain, &user.password_hash)? {
            Ok(Some(ClaimsData {
                login: user.login,
                admin: user.admin,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn get_by_login(db: &PgPool, login: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login = $1"
        ))
        .bind(login)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn get_short(db: &PgPool, login: &str) -> anyhow::Result<ShortUser> {
        let short = sqlx::query_as::<_, ShortUser>(
            "SELECT name, gender, birthday, revoked_on IS NULL AS active \
             FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_one(db)
        .await?;
        Ok(short)
    }

    pub async fn get_claims_data(db: &PgPool, login: &str) -> anyhow::Result<ClaimsData> {
        let data =
            sqlx::query_as::<_, ClaimsData>("SELECT login, admin FROM users WHERE login = $1")
                .bind(login)
                .fetch_one(db)
                .await?;
        Ok(data)
    }

    pub async fn create(
        db: &PgPool,
        reg: &RegistrationRequest,
        password_hash: &str,
        created_by: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO users \
             (guid, login, password_hash, name, gender, birthday, admin, created_on, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::new_v4())
        .bind(&reg.login)
        .bind(password_hash)
        .bind(&reg.name)
        .bind(reg.gender)
        .bind(reg.birthday)
        .bind(reg.admin)
        .bind(OffsetDateTime::now_utc())
        .bind(created_by)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE revoked_on IS NULL ORDER BY created_on ASC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Users strictly older than `age`, counted in whole calendar years
    /// (current year minus birth year; day and month are ignored). Users
    /// without a birthday never match.
    pub async fn list_over_age(db: &PgPool, age: i32) -> anyhow::Result<Vec<User>> {
        let current_year = OffsetDateTime::now_utc().year();
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE birthday IS NOT NULL \
               AND $1 - CAST(EXTRACT(YEAR FROM birthday) AS INT) > $2 \
             ORDER BY birthday ASC"
        ))
        .bind(current_year)
        .bind(age)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Applies the supplied fields only; an empty name counts as absent.
    /// Modified* is stamped when at least one field was supplied.
    pub async fn update_profile(
        db: &PgPool,
        req: &UpdateUserRequest,
        acting: &str,
    ) -> anyhow::Result<bool> {
        let user = Self::get_by_login(db, &req.login).await?;

        let name = req.name.as_deref().filter(|n| !n.is_empty());
        let touched = name.is_some() || req.gender.is_some() || req.birthday.is_some();

        let (modified_on, modified_by) = if touched {
            (Some(OffsetDateTime::now_utc()), Some(acting.to_owned()))
        } else {
            (user.modified_on, user.modified_by.clone())
        };

        let result = sqlx::query(
            "UPDATE users SET name = $2, gender = $3, birthday = $4, \
             modified_on = $5, modified_by = $6 WHERE login = $1",
        )
        .bind(&req.login)
        .bind(name.unwrap_or(&user.name))
        .bind(req.gender.unwrap_or(user.gender))
        .bind(req.birthday.or(user.birthday))
        .bind(modified_on)
        .bind(modified_by)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A user renaming themselves is recorded under their new login.
    pub async fn change_login(
        db: &PgPool,
        old_login: &str,
        new_login: &str,
        acting: &str,
    ) -> anyhow::Result<bool> {
        let modified_by = if acting == old_login {
            new_login
        } else {
            acting
        };
        let result = sqlx::query(
            "UPDATE users SET login = $2, modified_on = $3, modified_by = $4 WHERE login = $1",
        )
        .bind(old_login)
        .bind(new_login)
        .bind(OffsetDateTime::now_utc())
        .bind(modified_by)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn change_password(
        db: &PgPool,
        login: &str,
        password_hash: &str,
        acting: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, modified_on = $3, modified_by = $4 \
             WHERE login = $1",
        )
        .bind(login)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .bind(acting)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(db: &PgPool, login: &str, acting: &str) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE users SET revoked_on = $2, revoked_by = $3 WHERE login = $1")
                .bind(login)
                .bind(OffsetDateTime::now_utc())
                .bind(acting)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn hard_delete(db: &PgPool, login: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE login = $1")
            .bind(login)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn recover(db: &PgPool, login: &str, acting: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET revoked_on = NULL, revoked_by = NULL, \
             modified_on = $2, modified_by = $3 WHERE login = $1",
        )
        .bind(login)
        .bind(OffsetDateTime::now_utc())
        .bind(acting)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
