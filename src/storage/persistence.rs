use crate::error::Result;


/// Durable key-value storage of serialized blobs.
///
/// Every save replaces the whole blob stored under a key.
pub trait Persistence {
    /// Load a blob stored under `key`, if any.
    /// 
    /// * `key` - storage key
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store a blob under `key`, replacing the previous one.
    /// 
    /// * `key` - storage key
    /// * `blob` - serialized data
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}


impl<P: Persistence + ?Sized> Persistence for &P {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        (**self).save(key, blob)
    }
}


impl<P: Persistence + ?Sized> Persistence for std::rc::Rc<P> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        (**self).save(key, blob)
    }
}
