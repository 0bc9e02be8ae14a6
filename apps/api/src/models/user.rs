use serde::{Deserialize, Serialize};

/// A dashboard user account. Clients carry a `user_id` and the client list
/// can be filtered to one user's accounts; there is no authentication,
/// accounts only partition visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
}
