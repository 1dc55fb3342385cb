use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("weight for {factor} must not be negative (got {value})")]
    NegativeWeight { factor: &'static str, value: f64 },
    #[error("weight for {factor} is not a finite number")]
    NonFiniteWeight { factor: &'static str },
    #[error("weights sum to zero; at least one factor needs a positive weight")]
    ZeroWeightSum,
    #[error("taxonomy has a category with an empty name")]
    EmptyCategoryName,
    #[error("taxonomy lists category {0:?} more than once")]
    DuplicateCategory(String),
    #[error("{source_name} input is missing the required {column:?} column")]
    MissingColumn {
        source_name: &'static str,
        column: &'static str,
    },
}
