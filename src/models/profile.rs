use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_COUNTRY_LENGTH: usize = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

impl Profile {
    /// What a caller without a stored profile sees: the name from their token.
    pub fn placeholder(user_id: &str, name: Option<String>) -> Self {
        Profile {
            id: None,
            user_id: user_id.to_string(),
            full_name: name,
            bio: None,
            country: None,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields left out are unchanged; a blank value clears the field.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

fn checked(
    value: Option<String>,
    max_chars: usize,
    too_long: &'static str,
) -> Result<Option<Bson>, &'static str> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(Some(Bson::Null));
    }
    if value.chars().count() > max_chars {
        return Err(too_long);
    }
    Ok(Some(Bson::String(value.to_string())))
}

impl ProfileInput {
    /// The `$set` document for this edit, or the first validation message.
    pub fn into_changes(self) -> Result<Document, &'static str> {
        let mut changes = Document::new();

        let fields = [
            ("full_name", checked(self.full_name, MAX_NAME_LENGTH, "Full name must be at most 100 characters")?),
            ("bio", checked(self.bio, MAX_BIO_LENGTH, "Bio must be at most 500 characters")?),
            ("country", checked(self.country, MAX_COUNTRY_LENGTH, "Country must be at most 60 characters")?),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                changes.insert(key, value);
            }
        }

        if let Some(avatar_url) = self.avatar_url {
            let avatar_url = avatar_url.trim();
            if avatar_url.is_empty() {
                changes.insert("avatar_url", Bson::Null);
            } else if avatar_url.starts_with("https://") || avatar_url.starts_with("http://") {
                changes.insert("avatar_url", avatar_url);
            } else {
                return Err("Avatar URL must be an http(s) link");
            }
        }

        if changes.is_empty() {
            return Err("Nothing to update");
        }
        changes.insert("updated_at", DateTime::now());
        Ok(changes)
    }
}

/// Upsert for the caller's profile row.
pub fn profile_upsert(user_id: &str, changes: Document) -> Document {
    doc! {
        "$set": changes,
        "$setOnInsert": {
            "user_id": user_id,
            "created_at": DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_only_cover_sent_fields() {
        let input: ProfileInput =
            serde_json::from_str(r#"{"full_name": "  Amaya Silva ", "bio": ""}"#).unwrap();
        let changes = input.into_changes().unwrap();

        assert_eq!(changes.get_str("full_name").unwrap(), "Amaya Silva");
        assert_eq!(changes.get("bio"), Some(&Bson::Null));
        assert!(!changes.contains_key("country"));
        assert!(!changes.contains_key("avatar_url"));
        assert!(changes.contains_key("updated_at"));
    }

    #[test]
    fn test_invalid_changes() {
        let empty = ProfileInput::default();
        assert_eq!(empty.into_changes().unwrap_err(), "Nothing to update");

        let long_bio = ProfileInput {
            bio: Some("a".repeat(MAX_BIO_LENGTH + 1)),
            ..Default::default()
        };
        assert_eq!(long_bio.into_changes().unwrap_err(), "Bio must be at most 500 characters");

        let avatar = ProfileInput {
            avatar_url: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };
        assert_eq!(avatar.into_changes().unwrap_err(), "Avatar URL must be an http(s) link");
    }

    #[test]
    fn test_upsert_sets_owner_on_insert() {
        let changes = doc! { "country": "Sri Lanka" };
        let update = profile_upsert("user-1", changes);
        assert_eq!(
            update.get_document("$set").unwrap().get_str("country").unwrap(),
            "Sri Lanka"
        );
        assert_eq!(
            update.get_document("$setOnInsert").unwrap().get_str("user_id").unwrap(),
            "user-1"
        );
    }
}
