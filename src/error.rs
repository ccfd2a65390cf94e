use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("`{0}` is not an integer")]
    InvalidInteger(String),
    #[error("Exactly six values required, you provided {0}")]
    WrongValueCount(usize),
    #[error("input was closed before valid sales data was entered")]
    InputClosed,
    #[error("I/O failure, reason: `{0}`")]
    Io(String),
    #[error("worksheet `{0}` not found")]
    WorksheetNotFound(String),
    #[error("worksheet `{0}` has no data rows")]
    MissingRows(String),
    #[error("row and column indices start at 1, got {0}")]
    InvalidIndex(usize),
    #[error("cell in worksheet `{worksheet}` at row {row}, column {column} is not an integer: `{value}`")]
    InvalidCell {
        worksheet: String,
        row: usize,
        column: usize,
        value: String,
    },
    #[error("row {row} of worksheet `{worksheet}` has {len} values, expected 6")]
    RowLength {
        worksheet: String,
        row: usize,
        len: usize,
    },
    #[error("column {column} of worksheet `{worksheet}` is out of range for a 64-bit integer")]
    Overflow {
        worksheet: String,
        column: usize,
    },
    #[error("sales column {0} has no recorded history")]
    InsufficientHistory(usize),
    #[error("spreadsheet backend failed, reason: `{0}`")]
    Backend(String),
    #[error("run aborted after updating {completed:?}: {source}")]
    PartialUpdate {
        completed: Vec<String>,
        source: Box<Error>,
    },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Error::Backend(error.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Backend(error.to_string())
    }
}
