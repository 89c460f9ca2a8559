use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
    Driver,
    HotelOwner,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Driver => "driver",
            UserRole::HotelOwner => "hotel_owner",
        }
    }

    /// Roles a user may ask an admin for.
    pub fn is_requestable(&self) -> bool {
        matches!(self, UserRole::Driver | UserRole::HotelOwner)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub requested_role: UserRole,
    pub status: RequestStatus,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequestInput {
    pub requested_role: UserRole,
}

/// Admin decision on a pending request.
#[derive(Debug, Deserialize)]
pub struct RoleReviewInput {
    pub action: RequestStatus,
}

impl RoleRequest {
    pub fn new(user_id: String, email: Option<String>, requested_role: UserRole) -> Self {
        let now = DateTime::now();
        RoleRequest {
            id: None,
            user_id,
            email,
            requested_role,
            status: RequestStatus::Pending,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Granted role. The identity provider copies these rows into the
/// `app_roles` claim of issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub role: UserRole,
    pub created_at: Option<DateTime>,
}
