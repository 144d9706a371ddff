use serde::Serialize;
use sqlx::FromRow;

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub active: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Already hashed
    pub password: String,
}

impl NewUser {
    pub(crate) fn into_user(self, id: i32) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password: self.password,
            active: true,
            is_admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_user_hides_password() {
        let user = NewUser {
            username: "tyler".into(),
            email: "tyler@example.com".into(),
            password: "$argon2id$secret".into(),
        }
        .into_user(1);

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["isAdmin"], false);
        assert_eq!(value["active"], true);
        assert!(value.get("password").is_none());
    }
}
