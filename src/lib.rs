// Library root
// -----------
// Terminal client for the SpaceTraders game API. The binary (`main.rs`)
// wires these modules together and runs the interactive prompt.
//
// Module responsibilities:
// - `transport`: the blocking HTTP primitive (reqwest) behind a trait.
// - `envelope`: reads the error envelope before decoding any payload.
// - `api`: typed operations (status, account creation, account fetch).
// - `store`: SQLite persistence of the single local credential.
// - `poller`: startup gate that waits for the API to come online.
// - `config`, `logging`, `context`: settings file, log setup and the
//   application context handed to the UI.
// - `ui`: command parsing and the prompt loop.
pub mod api;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod models;
pub mod poller;
pub mod store;
pub mod transport;
pub mod ui;

pub use api::{ApiClient, Credential};
pub use error::ClientError;
pub use store::{CredentialStore, SqliteCredentialStore, StorageError};
pub use transport::{Headers, HttpMethod, HttpTransport, Transport};
