use serde::{Serialize, Deserialize};

use crate::error::Result;
use super::buffer::SecretBuffer;


/// Size of derived password hash in bytes.
pub(crate) const HASH_SIZE: usize = 32;


/// Cost parameters of Scrypt algorithm.
///
/// Stored next to each password hash, so changing the
/// parameters doesn't invalidate existing accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    log_n: u8,
    r: u32,
    p: u32,
}


impl KdfParams {
    /// Parameters recommended by Scrypt authors for interactive logins.
    pub fn recommended() -> Self {
        KdfParams {
            log_n: scrypt::Params::RECOMMENDED_LOG_N,
            r: scrypt::Params::RECOMMENDED_R,
            p: scrypt::Params::RECOMMENDED_P,
        }
    }

    /// Custom parameters. Fails if Scrypt doesn't accept them.
    ///
    /// * `log_n` - CPU/memory cost as a power of two
    /// * `r` - block size
    /// * `p` - parallelization
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self> {
        scrypt::Params::new(log_n, r, p, HASH_SIZE)?;
        Ok(KdfParams { log_n: log_n, r: r, p: p })
    }

    fn to_scrypt(self) -> Result<scrypt::Params> {
        Ok(scrypt::Params::new(self.log_n, self.r, self.p, HASH_SIZE)?)
    }
}


impl Default for KdfParams {
    fn default() -> Self {
        Self::recommended()
    }
}


/// KDF implementation struct.
pub(crate) struct Kdf;


impl Kdf {
    /// Derives a password hash using Scrypt algorithm.
    /// 
    /// * `pass` - password to derive hash from
    /// * `salt` - salt to use for derivation
    /// * `params` - cost parameters
    pub(crate) fn derive_hash(pass: &[u8], salt: &[u8], params: KdfParams) -> Result<SecretBuffer> {
        let mut result = SecretBuffer::new_with_size(HASH_SIZE);
        scrypt::scrypt(pass, salt, &params.to_scrypt()?, 
            result.as_mut_bytes())?;

        Ok(result)
    }
}
