use crate::{error::Error, record::Record};

/// Parse one line of operator input into a sales record.
/// Every comma-separated token must be an integer, and there must be exactly six of them.
pub fn parse_sales(line: &str) -> Result<Record, Error> {
    let values = line
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| Error::InvalidInteger(token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Record::try_from(values)
}
