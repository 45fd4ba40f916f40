use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Identity asserted by the OAuth provider after login
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// The record stored in the session cache for a logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
        }
    }
}

/// Public profile returned by the users API
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.picture,
        }
    }
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}
