use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::accounts::repo::User;

/// Request body for user creation. Only administrators may register users.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    pub login: String,
    pub password: String,
    pub name: String,
    pub gender: i32,
    pub birthday: Option<Date>,
    #[serde(default)]
    pub admin: bool,
}

/// Request body for profile updates; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub login: String,
    pub name: Option<String>,
    pub gender: Option<i32>,
    pub birthday: Option<Date>,
}

/// Query parameters for login change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoginQuery {
    pub old_login: String,
    pub new_login: String,
}

/// Request body for password change; the confirmation must match.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub login: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for deletion; soft deletion is the default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub login: String,
    #[serde(default = "default_soft_delete")]
    pub soft_delete: bool,
}

fn default_soft_delete() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct AgeQuery {
    pub age: Option<i32>,
}

/// Full user record minus the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub guid: Uuid,
    pub login: String,
    pub name: String,
    pub gender: i32,
    pub birthday: Option<Date>,
    pub admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified_on: Option<OffsetDateTime>,
    pub modified_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub revoked_on: Option<OffsetDateTime>,
    pub revoked_by: Option<String>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            guid: u.guid,
            login: u.login,
            name: u.name,
            gender: u.gender,
            birthday: u.birthday,
            admin: u.admin,
            created_on: u.created_on,
            created_by: u.created_by,
            modified_on: u.modified_on,
            modified_by: u.modified_by,
            revoked_on: u.revoked_on,
            revoked_by: u.revoked_by,
        }
    }
}

/// Data returned right after registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub guid: Uuid,
    pub login: String,
    pub name: String,
    pub gender: i32,
    pub birthday: Option<Date>,
    pub admin: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    pub created_by: String,
}

impl From<User> for CreatedUser {
    fn from(u: User) -> Self {
        Self {
            guid: u.guid,
            login: u.login,
            name: u.name,
            gender: u.gender,
            birthday: u.birthday,
            admin: u.admin,
            created_on: u.created_on,
            created_by: u.created_by,
        }
    }
}

/// Condensed lookup result: name, gender, birthday and activity status.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShortUser {
    pub name: String,
    pub gender: i32,
    pub birthday: Option<Date>,
    pub active: bool,
}

/// Response of a login change. `token` is present only when the subject
/// renamed themselves; an Admin renaming someone else leaves it out and the
/// subject's old token goes stale until their next login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedLoginResponse {
    pub metadata: Option<UserView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn sample_user() -> User {
        User {
            guid: Uuid::new_v4(),
            login: "bob1".into(),
            password_hash: "$argon2id$not-a-real-hash".into(),
            name: "Bob".into(),
            gender: 1,
            birthday: Some(date!(1990 - 05 - 20)),
            admin: false,
            created_on: datetime!(2025-01-02 03:04:05 UTC),
            created_by: "admin".into(),
            modified_on: None,
            modified_by: None,
            revoked_on: None,
            revoked_by: None,
        }
    }

    #[test]
    fn user_view_never_carries_the_password_hash() {
        let view = UserView::from(sample_user());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn user_view_serializes_camel_case_with_null_sentinels() {
        let view = UserView::from(sample_user());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["login"], "bob1");
        assert_eq!(json["birthday"], "1990-05-20");
        assert_eq!(json["createdBy"], "admin");
        assert!(json["modifiedOn"].is_null());
        assert!(json["revokedOn"].is_null());
        assert!(json["revokedBy"].is_null());
    }

    #[test]
    fn updated_login_response_omits_absent_token() {
        let body = UpdatedLoginResponse {
            metadata: Some(UserView::from(sample_user())),
            token: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["metadata"]["login"], "bob1");
    }

    #[test]
    fn delete_request_defaults_to_soft() {
        let req: DeleteUserRequest = serde_json::from_str(r#"{"login":"bob1"}"#).unwrap();
        assert!(req.soft_delete);
        let req: DeleteUserRequest =
            serde_json::from_str(r#"{"login":"bob1","softDelete":false}"#).unwrap();
        assert!(!req.soft_delete);
    }

    #[test]
    fn registration_defaults_admin_to_false() {
        let req: RegistrationRequest = serde_json::from_str(
            r#"{"login":"bob1","password":"Secret1","name":"Bob","gender":1}"#,
        )
        .unwrap();
        assert!(!req.admin);
        assert!(req.birthday.is_none());
    }
}
