use std::{
    error::Error,
    fmt::{self, Display},
};

use machine_learning::MlErr;

/// The result type used across the regressor.
pub type Result<T> = std::result::Result<T, FitErr>;

/// Failures while preparing data, training or predicting.
#[derive(Debug, PartialEq)]
pub enum FitErr {
    EmptyTable,
    ColumnLengthMismatch {
        column: String,
        got: usize,
        expected: usize,
    },
    ColumnNamesMismatch {
        got: usize,
        expected: usize,
    },
    RowCountMismatch {
        features: usize,
        target: usize,
    },
    RecordLengthMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
    EmptyTarget,
    NotATable(&'static str),
    Config(String),
    Ml(MlErr),
}

impl Display for FitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitErr::EmptyTable => write!(f, "the table has no columns or no rows"),
            FitErr::ColumnLengthMismatch {
                column,
                got,
                expected,
            } => write!(
                f,
                "column {column:?} has {got} rows, expected {expected} like the first column"
            ),
            FitErr::ColumnNamesMismatch { got, expected } => {
                write!(f, "got {got} column names for {expected} columns")
            }
            FitErr::RowCountMismatch { features, target } => write!(
                f,
                "the features have {features} rows but the target has {target}"
            ),
            FitErr::RecordLengthMismatch { row, got, expected } => write!(
                f,
                "target record {row} has {got} values, expected {expected} like the first record"
            ),
            FitErr::EmptyTarget => write!(f, "the target has no rows"),
            FitErr::NotATable(what) => write!(f, "{what} must be a table"),
            FitErr::Config(detail) => write!(f, "invalid configuration: {detail}"),
            FitErr::Ml(e) => write!(f, "{e}"),
        }
    }
}

impl Error for FitErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FitErr::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for FitErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}
