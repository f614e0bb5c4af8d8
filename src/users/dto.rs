use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Request body for `POST /users/`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /users/{id}/`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Request body for `POST /users/password-change/`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeRequest {
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserIdResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PasswordChangedResponse {
    pub id: Uuid,
    pub email: String,
    pub message: &'static str,
}

/// Validated input of `create`.
#[derive(Debug)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Validated input of `update`.
#[derive(Debug)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Validated input of `change_password`.
#[derive(Debug)]
pub struct ChangePassword {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

/// Decode a request body, accepting only a JSON object.
///
/// Derived `Deserialize` would also take a positional array.
pub fn from_object<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    if !body.is_object() {
        return Err(AppError::Validation(
            "Request body must be a JSON object".into(),
        ));
    }
    serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))
}

// Absent and empty strings both count as missing.
fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

impl TryFrom<CreateUserRequest> for CreateUser {
    type Error = AppError;

    fn try_from(r: CreateUserRequest) -> AppResult<Self> {
        match (
            present(r.first_name),
            present(r.last_name),
            present(r.email),
            present(r.password),
        ) {
            (Some(first_name), Some(last_name), Some(email), Some(password)) => Ok(Self {
                first_name,
                last_name,
                email,
                password,
            }),
            _ => Err(AppError::missing_fields()),
        }
    }
}

impl TryFrom<UpdateUserRequest> for UpdateUser {
    type Error = AppError;

    fn try_from(r: UpdateUserRequest) -> AppResult<Self> {
        match (present(r.first_name), present(r.last_name), present(r.email)) {
            (Some(first_name), Some(last_name), Some(email)) => Ok(Self {
                first_name,
                last_name,
                email,
            }),
            _ => Err(AppError::missing_fields()),
        }
    }
}

impl TryFrom<PasswordChangeRequest> for ChangePassword {
    type Error = AppError;

    fn try_from(r: PasswordChangeRequest) -> AppResult<Self> {
        match (
            present(r.email),
            present(r.current_password),
            present(r.new_password),
        ) {
            (Some(email), Some(current_password), Some(new_password)) => Ok(Self {
                email,
                current_password,
                new_password,
            }),
            _ => Err(AppError::missing_fields()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_with_all_fields_validates() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "pw"
        }))
        .unwrap();
        let input = CreateUser::try_from(req).unwrap();
        assert_eq!(input.email, "ada@example.com");
        assert_eq!(input.password, "pw");
    }

    #[test]
    fn absent_field_is_missing() {
        let req: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "first_name": "Ada", "email": "a@b.c" }))
                .unwrap();
        let err = UpdateUser::try_from(req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_string_is_missing() {
        let req = PasswordChangeRequest {
            email: Some("a@b.c".into()),
            current_password: Some(String::new()),
            new_password: Some("new".into()),
        };
        assert!(ChangePassword::try_from(req).is_err());
    }

    #[test]
    fn positional_array_body_is_rejected() {
        let body = serde_json::json!(["Ada", "Lovelace", "ada@example.com", "pw"]);
        let err = from_object::<CreateUserRequest>(body).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn object_body_decodes_and_ignores_extras() {
        let body = serde_json::json!({ "email": "a@b.c", "nickname": "ada" });
        let req = from_object::<PasswordChangeRequest>(body).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.c"));
        assert!(req.new_password.is_none());
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let body = serde_json::json!({ "first_name": 7 });
        assert!(from_object::<UpdateUserRequest>(body).is_err());
    }

    #[test]
    fn whitespace_counts_as_present() {
        let req = UpdateUserRequest {
            first_name: Some(" ".into()),
            last_name: Some("L".into()),
            email: Some("a@b.c".into()),
        };
        assert!(UpdateUser::try_from(req).is_ok());
    }
}
