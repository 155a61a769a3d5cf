//! Persist session cookies per username so a later run can skip the password
//! login while the session is still valid.
//!
//! File format: `{"cookies": [{"cookie": {"name": .., "value": ..}}]}`; an
//! optional `expires` (unix seconds) is written when the server set one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::cookies::{now_unix, StoredCookie};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    cookies: Vec<CookieEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CookieEntry {
    cookie: CookieRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct CookieRecord {
    name: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<i64>,
}

/// Directory of cached sessions, one file per username.
#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location: `~/.local/state/toclient/sessions`.
    pub fn default_dir() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("toclient")?;
        Ok(xdg_dirs.get_state_home().join("toclient").join("sessions"))
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_dir()?))
    }

    /// File for `username`. The name is hashed so any username is a safe file name.
    pub fn path_for(&self, username: &str) -> PathBuf {
        let digest = Sha256::digest(username.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// Cached cookies for `username`, or `None` if missing, unreadable as a
    /// session, or every cookie has expired.
    pub fn load(&self, username: &str) -> Result<Option<Vec<StoredCookie>>> {
        load_from_path(&self.path_for(username))
    }

    /// Write the session for `username` (creates the directory if needed).
    pub fn save(&self, username: &str, cookies: &[StoredCookie]) -> Result<()> {
        save_to_path(&self.path_for(username), cookies)
    }

    pub fn remove(&self, username: &str) -> Result<()> {
        let path = self.path_for(username);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session: {}", path.display())),
        }
    }
}

fn load_from_path(path: &Path) -> Result<Option<Vec<StoredCookie>>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read session: {}", path.display())),
    };
    let file: SessionFile = match serde_json::from_slice(&bytes) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt session cache");
            return Ok(None);
        }
    };
    let now = now_unix();
    let cookies: Vec<StoredCookie> = file
        .cookies
        .into_iter()
        .map(|e| StoredCookie {
            name: e.cookie.name,
            value: e.cookie.value,
            expires: e.cookie.expires,
        })
        .filter(|c| !c.is_expired_at(now))
        .collect();
    if cookies.is_empty() {
        Ok(None)
    } else {
        Ok(Some(cookies))
    }
}

fn save_to_path(path: &Path, cookies: &[StoredCookie]) -> Result<()> {
    let file = SessionFile {
        cookies: cookies
            .iter()
            .map(|c| CookieEntry {
                cookie: CookieRecord {
                    name: c.name.clone(),
                    value: c.value.clone(),
                    expires: c.expires,
                },
            })
            .collect(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&file).context("serialize session")?;
    std::fs::write(path, json).with_context(|| format!("write session: {}", path.display()))?;
    Ok(())
}
