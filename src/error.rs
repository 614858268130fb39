use rust_decimal::Decimal;

/// Rejections raised by the session store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Session has not been initialized")]
    NotInitialized,
    #[error("{field} amount cannot be negative (got {amount})")]
    NegativeAmount { field: String, amount: Decimal },
    #[error("Amounts too large to total")]
    Overflow,
}

impl StoreError {
    pub fn negative(field: impl Into<String>, amount: Decimal) -> Self {
        StoreError::NegativeAmount {
            field: field.into(),
            amount,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
