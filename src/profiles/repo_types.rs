use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub first_name: String,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub discord_id: Option<String>,
    pub tech_stack: Vec<String>,      // skills offered
    pub looking_to_learn: Vec<String>, // empty means open to anything
    pub avatar: Option<String>,
    pub impression_count: i64,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>, // at most one valid value, NULL when logged out
    pub created_at: OffsetDateTime,
}

/// Allow-listed profile updates. `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub discord_id: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub looking_to_learn: Option<Vec<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.github_url.is_none()
            && self.linkedin_url.is_none()
            && self.discord_id.is_none()
            && self.tech_stack.is_none()
            && self.looking_to_learn.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_never_contains_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            email: "dev@example.com".into(),
            password_hash: "argon2-secret".into(),
            first_name: "Dev".into(),
            last_name: None,
            bio: None,
            github_url: None,
            linkedin_url: None,
            discord_id: None,
            tech_stack: vec![],
            looking_to_learn: vec![],
            avatar: None,
            impression_count: 3,
            refresh_token: Some("refresh-secret".into()),
            created_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-secret"));
        assert!(!json.contains("refresh-secret"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("refresh_token"));
    }
}
