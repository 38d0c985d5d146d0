use thiserror::Error;

/// Errors reported by checked access to a [`SyncVec`](crate::SyncVec)
///
/// Absence of a key is never an error: lookups return `Option`. The only
/// failure in this crate is indexing past the end of a sequence, which the
/// unchecked accessors treat as fatal and the `try_` accessors return as
/// this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The index was not in `0..len`
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl Error {
    pub(crate) fn check_index(index: usize, len: usize) -> Result<(), Error> {
        if index < len {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds { index, len })
        }
    }
}
