use serde::{Deserialize, Serialize};

/// A managed advertising account. Every persisted entity except the client
/// list itself is scoped to a client id; deleting a client cascades over
/// history, performance rows and processed-report hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub currency: String,
    pub user_id: String,
}
