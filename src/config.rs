// Runtime configuration and token helpers. Everything here is read from
// the environment once, at startup, and then handed to the client by value.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GistError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SEPARATOR: &str = "#%%";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size used for every listing request.
pub const PER_PAGE: u32 = 100;

const TOKEN_FILE: &str = ".gistyc_token";

/// Opaque bearer token. Immutable once built, and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into().trim().to_string())
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("token {}", self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_API_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            separator: DEFAULT_SEPARATOR.into(),
        }
    }
}

impl Config {
    /// Build a config from `GISTYC_API_URL`, `GISTYC_TIMEOUT_SECS` and
    /// `GISTYC_SEPARATOR`, falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("GISTYC_API_URL").filter(|s| !s.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("GISTYC_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GistError::InvalidArgument(format!("GISTYC_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            if secs == 0 {
                return Err(GistError::InvalidArgument(
                    "GISTYC_TIMEOUT_SECS must be positive".into(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(sep) = lookup("GISTYC_SEPARATOR").filter(|s| !s.is_empty()) {
            config.separator = sep;
        }

        Ok(config)
    }
}

/// Location of the persisted token in the user's home directory.
pub fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

/// Persist token into the token file.
pub fn persist_token(token: &str) -> Result<PathBuf> {
    let path = token_path();
    write_token(&path, token)?;
    Ok(path)
}

/// Write `token` to `path`, readable by the owner only on unix.
pub fn write_token(path: &Path, token: &str) -> Result<()> {
    let to_error = |source| GistError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(to_error)?;

    // mode() only applies on creation; tighten a pre-existing file too
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(to_error)?;
    }
    file.write_all(token.trim().as_bytes()).map_err(to_error)
}

/// Load the persisted token, if there is a non-empty one.
pub fn load_token() -> Option<Credential> {
    let data = std::fs::read_to_string(token_path()).ok()?;
    let credential = Credential::new(data);
    (!credential.is_empty()).then_some(credential)
}
