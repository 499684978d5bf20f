use rand::{RngCore, SeedableRng};
use serde::{Serialize, Deserialize};
use subtle::ConstantTimeEq;

use crate::error::{Result, Error, ErrorKind};
use crate::storage::Persistence;
use super::kdf::{Kdf, KdfParams};
use super::session::{Session, User};
use super::{DUPLICATE_ACCOUNT, INVALID_CREDENTIALS};


/// Storage key of registered users.
const USERS_KEY: &str = "users";

/// Size of password salt in bytes.
const SALT_SIZE: usize = 16;


/// User record together with its credentials.
#[derive(Serialize, Deserialize)]
struct Credentials {
    #[serde(flatten)]
    user: User,

    /// Random per-user salt
    salt: Vec<u8>,

    /// Scrypt hash of password
    hash: Vec<u8>,

    /// Parameters the hash was derived with
    kdf: KdfParams,
}


/// Credential store: registers users and opens sessions.
///
/// Passwords are never stored, only salted Scrypt hashes.
pub struct Accounts<P: Persistence> {
    /// Storage used to store registered users.
    storage: P,

    /// Cost parameters for new password hashes.
    params: KdfParams,
}


impl<P: Persistence> Accounts<P> {
    /// Creates a credential store with recommended hashing cost.
    ///
    /// * `storage` - storage used to store users
    pub fn new(storage: P) -> Self {
        Self::with_params(storage, KdfParams::recommended())
    }

    /// Creates a credential store with custom hashing cost.
    ///
    /// * `storage` - storage used to store users
    /// * `params` - cost parameters for new password hashes
    pub fn with_params(storage: P, params: KdfParams) -> Self {
        Accounts {
            storage: storage,
            params: params
        }
    }

    /// Registers a new user and logs them in.
    ///
    /// * `name` - display name
    /// * `email` - login email, must not be registered yet
    /// * `password` - plain password, only its hash is stored
    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let name = name.trim();
        let email = Self::normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(Error::from_message("Name, email and password are required"));
        }

        let mut registered = self.load()?;
        if registered.iter().any(|c| c.user.email == email) {
            tracing::warn!(email = %email, "signup with registered email");
            return Err(Error::new(ErrorKind::DuplicateAccount, DUPLICATE_ACCOUNT));
        }

        let salt = Self::generate_salt()?;

        let hash = Kdf::derive_hash(password.as_bytes(), &salt, self.params)?;

        let user = User {
            id: uuid::Uuid::new_v4(),
            name: name.to_owned(),
            email: email,
            created_at: chrono::Utc::now(),
        };

        registered.push(Credentials {
            user: user.clone(),
            salt: salt,
            hash: hash.as_bytes().to_vec(),
            kdf: self.params,
        });

        self.save(&registered)?;

        tracing::info!(user = %user.id, "user registered");
        Ok(Session::new(user))
    }

    /// Checks credentials and opens a session.
    ///
    /// Fails the same way for unknown email and wrong password.
    ///
    /// * `email` - login email
    /// * `password` - plain password
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = Self::normalize_email(email);
        let registered = self.load()?;

        let credentials = match registered.into_iter().find(|c| c.user.email == email) {
            Some(credentials) => credentials,
            None => {
                tracing::warn!(email = %email, "login with unknown email");
                return Err(Error::new(ErrorKind::InvalidCredentials, INVALID_CREDENTIALS));
            }
        };

        let hash = Kdf::derive_hash(password.as_bytes(), &credentials.salt, credentials.kdf)?;
        let matches: bool = hash
            .as_bytes()
            .ct_eq(&credentials.hash)
            .into();

        if !matches {
            tracing::warn!(user = %credentials.user.id, "login with wrong password");
            return Err(Error::new(ErrorKind::InvalidCredentials, INVALID_CREDENTIALS));
        }

        Ok(Session::new(credentials.user))
    }

    /// Return all registered users.
    pub fn users(&self) -> Result<Vec<User>> {
        Ok(self.load()?
            .into_iter()
            .map(|c| c.user)
            .collect())
    }
}


impl<P: Persistence> Accounts<P> {
    fn normalize_email(email: &str) -> String {
        email
            .trim()
            .to_lowercase()
    }

    fn generate_salt() -> Result<Vec<u8>> {
        let mut salt = vec![0u8; SALT_SIZE];

        rand::rngs::StdRng::from_entropy()
            .try_fill_bytes(&mut salt)?;

        Ok(salt)
    }

    fn load(&self) -> Result<Vec<Credentials>> {
        match self.storage.load(USERS_KEY)? {
            Some(blob) => serde_json::from_str(&blob)
                .map_err(|e| Error::from(e).with_extra(USERS_KEY)),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, registered: &[Credentials]) -> Result<()> {
        let blob = serde_json::to_string(registered)
            .map_err(|e| Error::from(e).into_kind(ErrorKind::Persistence))?;

        self.storage
            .save(USERS_KEY, &blob)
    }
}
