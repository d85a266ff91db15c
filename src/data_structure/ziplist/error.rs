#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipListError {
    #[error("A string of zero length or excessive length")]
    InValidString,
    #[error("FirstDigitError")]
    InvalidFirstDigit,
    #[error("InvalidChar")]
    InvalidChar,
    #[error("Mul overflow")]
    OverFlowMul,
    #[error("Add overflow")]
    OverFlowAdd,
    #[error("Negative overflow")]
    OverFlowNegative,
    #[error("Positive overflow")]
    OverFlowPositive,
    #[error("Corrupt ziplist: {0}")]
    Corrupt(String),
}
