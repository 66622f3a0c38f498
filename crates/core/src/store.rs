// File-backed credential store
// Decision: The whole user file is mirrored in a HashMap guarded by parking_lot's RwLock
// Decision: Registrations hold an upgradable read for check -> hash -> append, then upgrade
//           to insert. Lookups keep running during the append and never see a half-applied
//           registration.
//
// File format: one `email,password_hash` record per line. Fields are not escaped.

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{CredentialError, Result};
use crate::password::{hash_password, verify_password, HashCost};
use crate::validation::validate_credentials;

const FIELD_DELIMITER: char = ',';

/// Read access to registered accounts.
///
/// The session gate only needs to know whether an account still exists, so it depends
/// on this trait rather than on the concrete store.
pub trait UserDirectory: Send + Sync {
    /// Return the stored password hash for `email`, or `CredentialError::NotFound`
    fn find(&self, email: &str) -> Result<String>;
}

/// Append-only credential file with an in-memory mirror
pub struct CredentialStore {
    path: PathBuf,
    cost: HashCost,
    users: RwLock<HashMap<String, String>>,
}

impl CredentialStore {
    /// Open the store at `path` with the default hash cost, creating an empty file if needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_cost(path, HashCost::default())
    }

    /// Open the store at `path`, hashing new passwords with `cost`
    pub fn open_with_cost(path: impl Into<PathBuf>, cost: HashCost) -> Result<Self> {
        let path = path.into();
        let users = match File::open(&path) {
            Ok(file) => read_records(file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                create_empty(&path)?;
                tracing::info!(path = %path.display(), "Created empty credential file");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            users = users.len(),
            "Credential store loaded"
        );

        Ok(Self {
            path,
            cost,
            users: RwLock::new(users),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Exact, case-sensitive lookup of the stored hash
    pub fn find(&self, email: &str) -> Result<String> {
        self.users
            .read()
            .get(email)
            .cloned()
            .ok_or(CredentialError::NotFound)
    }

    /// Register a new account.
    ///
    /// The record is appended to the backing file before it becomes visible in memory;
    /// if the append fails the store is left unchanged.
    pub fn add_user(&self, email: &str, password: &str) -> Result<()> {
        validate_credentials(email, password)?;

        let users = self.users.upgradable_read();
        if users.contains_key(email) {
            tracing::debug!("Rejected registration for an existing email");
            return Err(CredentialError::Conflict);
        }

        let hash = hash_password(password, self.cost)?;

        if let Err(e) = self.append_record(email, &hash) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to append user record");
            return Err(e.into());
        }

        let mut users = RwLockUpgradableReadGuard::upgrade(users);
        users.insert(email.to_string(), hash);
        tracing::info!(users = users.len(), "User registered");

        Ok(())
    }

    /// Check a login attempt.
    ///
    /// Malformed input, unknown email and wrong password all yield `CredentialError::Auth`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<()> {
        if validate_credentials(email, password).is_err() {
            return Err(CredentialError::Auth);
        }

        let hash = self.find(email).map_err(|_| CredentialError::Auth)?;

        match verify_password(password, &hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CredentialError::Auth),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                Err(CredentialError::Auth)
            }
        }
    }

    fn append_record(&self, email: &str, hash: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let line = format!("{email}{FIELD_DELIMITER}{hash}\n");
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl UserDirectory for CredentialStore {
    fn find(&self, email: &str) -> Result<String> {
        CredentialStore::find(self, email)
    }
}

fn create_empty(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)?;
    Ok(())
}

fn read_records(file: File) -> Result<HashMap<String, String>> {
    let mut users = HashMap::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let &[email, hash] = fields.as_slice() else {
            return Err(CredentialError::MalformedRecord {
                line: idx + 1,
                fields: fields.len(),
            });
        };

        users.insert(email.to_string(), hash.to_string());
    }

    Ok(users)
}
