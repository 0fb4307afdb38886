use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("index {index} is out of bounds for a set sized for {max} ids")]
    OutOfBounds { index: usize, max: usize },

    #[error("the set is locked")]
    Locked,
}
