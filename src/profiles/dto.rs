use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo_types::{ProfileChanges, User};

/// Public part of a user returned to clients; never carries the password
/// hash or refresh token.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub discord_id: Option<String>,
    pub tech_stack: Vec<String>,
    pub looking_to_learn: Vec<String>,
    pub avatar: Option<String>,
    pub impression_count: i64,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            bio: u.bio,
            github_url: u.github_url,
            linkedin_url: u.linkedin_url,
            discord_id: u.discord_id,
            tech_stack: u.tech_stack,
            looking_to_learn: u.looking_to_learn,
            avatar: u.avatar,
            impression_count: u.impression_count,
            created_at: u.created_at,
        }
    }
}

/// Request body for profile updates. Only the fields listed here are
/// updatable; anything else in the payload is ignored by construction.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default)]
    pub looking_to_learn: Option<Vec<String>>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed_tags(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.filter(|v| !v.is_empty()).map(|tags| {
        tags.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}

impl UpdateProfileRequest {
    /// Field-by-field normalization: strings are trimmed and blank values
    /// are treated as "no change"; tag lists are trimmed with empties
    /// dropped.
    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            bio: trimmed(self.bio),
            github_url: trimmed(self.github_url),
            linkedin_url: trimmed(self.linkedin_url),
            discord_id: trimmed(self.discord_id),
            tech_stack: trimmed_tags(self.tech_stack),
            looking_to_learn: trimmed_tags(self.looking_to_learn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_not_updates() {
        let request = UpdateProfileRequest {
            first_name: Some("  ".into()),
            bio: Some(" hi there ".into()),
            ..Default::default()
        };
        let changes = request.into_changes();
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.bio.as_deref(), Some("hi there"));
        assert!(!changes.is_empty());
    }

    #[test]
    fn tag_lists_are_trimmed_and_emptied_of_blanks() {
        let request = UpdateProfileRequest {
            tech_stack: Some(vec![" Rust ".into(), "  ".into(), "Go".into()]),
            looking_to_learn: Some(vec![]),
            ..Default::default()
        };
        let changes = request.into_changes();
        assert_eq!(
            changes.tech_stack,
            Some(vec!["Rust".to_string(), "Go".to_string()])
        );
        // An empty list in the payload is "no change", not "clear".
        assert_eq!(changes.looking_to_learn, None);
    }

    #[test]
    fn all_blank_payload_is_empty() {
        let changes = UpdateProfileRequest::default().into_changes();
        assert!(changes.is_empty());
    }

    #[test]
    fn public_profile_has_no_credential_fields() {
        let json = serde_json::to_string(&PublicProfile {
            id: Uuid::new_v4(),
            email: "dev@example.com".into(),
            first_name: "Dev".into(),
            last_name: None,
            bio: None,
            github_url: None,
            linkedin_url: None,
            discord_id: None,
            tech_stack: vec![],
            looking_to_learn: vec![],
            avatar: None,
            impression_count: 0,
            created_at: OffsetDateTime::now_utc(),
        })
        .unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("refresh_token"));
    }
}
