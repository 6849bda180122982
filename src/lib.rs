// Library root
// ------------
// A thin client over the gist REST API, driven by local files.
//
// Module responsibilities:
// - `bundle`: splits a local file into named blocks on a separator line.
// - `resolve`: maps a file name to exactly one remote gist id.
// - `api`: the blocking client (list, create, update, delete).
// - `transport`: the HTTP seam the client sends requests through.
// - `sync`: walks a directory and creates or updates a gist per file.
// - `cli` / `ui`: argument parsing and terminal output for the binary.
pub mod api;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod resolve;
pub mod sync;
pub mod transport;
pub mod ui;

#[cfg(any(test, feature = "test_utils"))]
pub mod mock;

pub use api::GistClient;
pub use bundle::FileBundle;
pub use config::{Config, Credential};
pub use error::{GistError, Result};
pub use model::{Directory, Gist};
pub use resolve::Resolution;
