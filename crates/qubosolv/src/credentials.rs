//! Local credential file.
//!
//! Username and password for the identity provider are kept in a small JSON
//! file so that they only have to be supplied once:
//!
//! ```json
//! {
//!     "username": "alice",
//!     "password": "secret"
//! }
//! ```
//!
//! Keys other than `username` and `password` are left untouched when new
//! credentials are written.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{QuboError, QuboResult};

/// File name used when the credential path is a directory or not given.
pub const FILE_NAME: &str = "client_secrets.json";

/// Directory under the user config dir that holds the default credential file.
const APP_DIR: &str = "qubosolv";

/// Username/password pair for the identity provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Handle to the credential file on disk.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Open the store at `file`, or at [`default_path`](Self::default_path)
    /// when no file is given.
    ///
    /// An existing directory gets [`FILE_NAME`] appended, and a path that does
    /// not end in `.json` gets the extension added.
    pub fn resolve(file: Option<impl AsRef<Path>>) -> Self {
        let path = match file {
            Some(file) => normalize(file.as_ref()),
            None => Self::default_path(),
        };
        debug!("Using credential file {}", path.display());
        Self { path }
    }

    /// Default credential location: `<config dir>/qubosolv/client_secrets.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_default()
            .join(APP_DIR)
            .join(FILE_NAME)
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the credential file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Check the supplied username/password pair and persist it when complete.
    ///
    /// Both given: they overwrite the stored pair. Neither given: the file
    /// must already exist. Only one given: configuration error.
    pub fn accept(&self, username: Option<&str>, password: Option<&str>) -> QuboResult<()> {
        match (username, password) {
            (Some(username), Some(password)) => self.save(&Credentials::new(username, password)),
            (None, None) if self.exists() => Ok(()),
            (None, None) => Err(QuboError::config(format!(
                "credential file {} does not exist and username/password is not given",
                self.path.display()
            ))),
            _ => Err(QuboError::config(
                "only username or password is given, but both are needed",
            )),
        }
    }

    /// Write `credentials`, merging into the existing file if there is one.
    pub fn save(&self, credentials: &Credentials) -> QuboResult<()> {
        let mut data = if self.exists() {
            self.read_object()?
        } else {
            Map::new()
        };
        data.insert("username".into(), Value::String(credentials.username.clone()));
        data.insert("password".into(), Value::String(credentials.password.clone()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, to_indented_json(&Value::Object(data))?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Read the stored username/password pair.
    pub fn load(&self) -> QuboResult<Credentials> {
        if !self.exists() {
            return Err(QuboError::config(format!(
                "credential file {} does not exist",
                self.path.display()
            )));
        }

        let data = self.read_object()?;
        let field = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);

        match (field("username"), field("password")) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(QuboError::config(
                "username and password are not saved, therefore a token cannot be generated \
                 and no token is given",
            )),
        }
    }

    /// Delete the credential file. Succeeds if there is nothing to delete.
    pub fn clear(&self) -> QuboResult<()> {
        if self.exists() {
            fs::remove_file(&self.path)?;
            debug!("Removed credential file {}", self.path.display());
        }
        Ok(())
    }

    fn read_object(&self) -> QuboResult<Map<String, Value>> {
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(QuboError::config(format!(
                "credential file {} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

fn normalize(file: &Path) -> PathBuf {
    let mut path = if file.is_dir() {
        file.join(FILE_NAME)
    } else {
        file.to_path_buf()
    };

    if !path.as_os_str().to_string_lossy().ends_with(".json") {
        let mut name = path.clone().into_os_string();
        name.push(".json");
        path = PathBuf::from(name);
    }

    path
}

/// Serialize with four-space indentation.
fn to_indented_json(value: &Value) -> QuboResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
