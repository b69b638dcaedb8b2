// Response payloads of the game API. Fields we do not use are ignored by
// serde; the ones that may be missing in older responses default.
//
// Ships and loans are kept as raw JSON values: the CLI only counts them,
// and gameplay types are out of scope for this client.

use serde::{Deserialize, Serialize};

/// Message the API reports when it is up and accepting players.
pub const OK_STATUS_MESSAGE: &str = "spacetraders is currently online and available to play";

/// Response of `GET /game/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStatus {
    pub status: String,
}

impl GameStatus {
    /// True only for a byte-exact match of the online message.
    pub fn is_online(&self) -> bool {
        self.status == OK_STATUS_MESSAGE
    }
}

/// The user object embedded in account responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InnerUser {
    pub username: String,
    #[serde(default)]
    pub credits: i64,
    // A freshly created account comes back without ships or loans.
    #[serde(default)]
    pub ships: Vec<serde_json::Value>,
    #[serde(default)]
    pub loans: Vec<serde_json::Value>,
}

/// Response of `POST /users/{username}/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub token: String,
    pub user: InnerUser,
}

/// Response of `GET /users/{username}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchedUser {
    pub user: InnerUser,
}
