//! User profile record

use serde::{Deserialize, Serialize};

/// Profile record returned by signup/login/profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId", alias = "_id", alias = "id")]
    pub user_id: String,
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(rename = "userEmail", default)]
    pub user_email: String,
}
