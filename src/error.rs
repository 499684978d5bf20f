/// Kinds of errors in xpns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller passed malformed data (e.g. negative or non-numeric amount).
    Validation,

    /// Update or removal targets a record that does not exist.
    NotFound,

    /// Durable storage refused to save data. In-memory state is unchanged.
    Persistence,

    /// Stored data is unreadable or corrupted.
    Storage,

    /// Account with the same email is already registered.
    DuplicateAccount,

    /// Email or password does not match.
    InvalidCredentials,

    /// Credential hashing failed.
    Crypto,

    /// Report generation failed.
    Export,
}


/// Structure, that describes all errors in xpns.
#[derive(Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    extra: String
}


impl Error {
    /// Creates an error of a given kind with a message only.
    ///
    /// * `kind` - kind of error
    /// * `msg` - human-readable message
    pub fn new<S: Into<String>>(kind: ErrorKind, msg: S) -> Self {
        Error {
            kind: kind,
            msg: msg.into(),
            extra: String::new()
        }
    }

    /// Creates a validation error with a message.
    ///
    /// * `msg` - human-readable message
    pub fn from_message<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }

    /// Attaches additional information to the error.
    ///
    /// * `extra` - additional information
    pub fn with_extra<S: Into<String>>(mut self, extra: S) -> Self {
        self.extra = extra.into();
        self
    }

    /// Changes kind of the error, keeping message and extra info.
    pub(crate) fn into_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message, suitable to be shown to a user.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns true if the failed operation can be retried as is.
    pub fn is_recoverable(&self) -> bool {
        self.kind == ErrorKind::Persistence
    }
}


impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, r#"Message: "{}" (extra: "{}")"#, self.msg, self.extra)
    }
}


impl std::error::Error for Error {}


impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::new(ErrorKind::Persistence, value.to_string())
            .with_extra(format!("io kind: {:?}", value.kind()))
    }
}


impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::new(ErrorKind::Storage, value.to_string())
            .with_extra(format!("line: {}, column: {}", value.line(), value.column()))
    }
}


impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        let extra = match value.sqlite_error_code() {
            Some(code) => format!("sqlite code: {:?}", code),
            None => String::new(),
        };

        Error::new(ErrorKind::Persistence, value.to_string())
            .with_extra(extra)
    }
}


impl From<rust_decimal::Error> for Error {
    fn from(value: rust_decimal::Error) -> Self {
        Error::new(ErrorKind::Validation, value.to_string())
    }
}


impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::new(ErrorKind::Export, value.to_string())
    }
}


impl From<scrypt::errors::InvalidParams> for Error {
    fn from(value: scrypt::errors::InvalidParams) -> Self {
        Error::new(ErrorKind::Crypto, value.to_string())
    }
}


impl From<scrypt::errors::InvalidOutputLen> for Error {
    fn from(value: scrypt::errors::InvalidOutputLen) -> Self {
        Error::new(ErrorKind::Crypto, value.to_string())
    }
}


impl From<rand::Error> for Error {
    fn from(value: rand::Error) -> Self {
        Error::new(ErrorKind::Crypto, value.to_string())
    }
}


/// Crate-specific alias for [`std::result::Result`] instantiated
/// with [`crate::error::Error`].
pub type Result<T> = std::result::Result<T, Error>;
