use itertools::Itertools;

use crate::error::Error;

/// Number of product categories tracked in every worksheet.
pub const CATEGORY_COUNT: usize = 6;

/// One worksheet row: a quantity per product category,
/// in the column order shared by the sales, stock and surplus worksheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record([i64; CATEGORY_COUNT]);

impl Record {
    pub fn new(values: [i64; CATEGORY_COUNT]) -> Self {
        Record(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Position-wise `self - rhs`, destined for `worksheet`.
    /// Fails on the first column whose difference does not fit in an `i64`.
    pub fn try_sub(self, rhs: Record, worksheet: &str) -> Result<Record, Error> {
        let mut values = self.0;
        for (index, (value, subtrahend)) in values.iter_mut().zip(rhs.0).enumerate() {
            *value = value
                .checked_sub(subtrahend)
                .ok_or_else(|| Error::Overflow {
                    worksheet: worksheet.to_string(),
                    column: index + 1,
                })?;
        }
        Ok(Record(values))
    }

    /// Cell text for appending the record as a worksheet row.
    pub fn to_cells(&self) -> Vec<String> {
        self.iter().map(|value| value.to_string()).collect()
    }

    /// Parse a stored row back into a record.
    /// Trailing blank cells are ignored; `row` is the 1-based row number used in errors.
    pub fn from_cells(worksheet: &str, row: usize, cells: &[String]) -> Result<Self, Error> {
        let len = cells
            .iter()
            .rposition(|cell| !cell.trim().is_empty())
            .map_or(0, |last| last + 1);
        if len != CATEGORY_COUNT {
            return Err(Error::RowLength {
                worksheet: worksheet.to_string(),
                row,
                len,
            });
        }

        let values = cells[..len]
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.trim().parse::<i64>().map_err(|_| Error::InvalidCell {
                    worksheet: worksheet.to_string(),
                    row,
                    column: index + 1,
                    value: cell.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Record::try_from(values)
    }
}

impl TryFrom<Vec<i64>> for Record {
    type Error = Error;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        let len = values.len();
        values
            .try_into()
            .map(Record)
            .map_err(|_| Error::WrongValueCount(len))
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.iter().join(", "))
    }
}
