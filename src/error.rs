use thiserror::Error;

/// Failures raised by the column store, views and series extractors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("index {index} out of range [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("shape mismatch: expected length {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
}

pub type TableResult<T> = std::result::Result<T, TableError>;

/// Checks `index < len`, the bounds rule shared by views, columns and extractors.
pub(crate) fn check_index(index: usize, len: usize) -> TableResult<()> {
    if index >= len {
        return Err(TableError::IndexOutOfRange { index, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TableError::ColumnNotFound("y".to_string()).to_string(),
            "column 'y' not found"
        );
        assert_eq!(
            TableError::IndexOutOfRange { index: 3, len: 3 }.to_string(),
            "index 3 out of range [0, 3)"
        );
    }

    #[test]
    fn test_check_index() {
        assert!(check_index(0, 1).is_ok());
        assert_eq!(
            check_index(1, 1),
            Err(TableError::IndexOutOfRange { index: 1, len: 1 })
        );
    }
}
