/// Struct for wrapping a sensitive data.
/// 
/// Implements [`core::ops::Drop`] trait, that erases internal 
/// data at destruction time.
pub(crate) struct SecretBuffer {
    /// Raw internal data
    data: Vec<u8>
}


impl SecretBuffer {
    /// Creates a buffer with specified amount of zeros.
    /// 
    /// * `size` - initial size of buffer
    pub(crate) fn new_with_size(size: usize) -> Self {
        SecretBuffer { data: vec![0; size] }
    }

    /// Returns read-only raw bytes of the stored data.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns mutable raw bytes of the stored data.
    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }
}


impl Drop for SecretBuffer {
    fn drop(&mut self) {
        //
        // Just zero stored memory
        //

        for e in self.data.iter_mut() {
            *e = 0u8;
        }
    }
}
