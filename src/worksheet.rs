use std::collections::BTreeMap;

use crate::error::Error;

pub const SALES: &str = "sales";
pub const STOCK: &str = "stock";
pub const SURPLUS: &str = "surplus";

/// The operations the automation needs from a spreadsheet service.
/// Rows and columns are numbered from 1, as the service numbers them.
pub trait Spreadsheet {
    /// Append `cells` as a new trailing row of `worksheet`.
    fn append_row(&mut self, worksheet: &str, cells: &[String]) -> Result<(), Error>;

    /// Every row of `worksheet`, top to bottom.
    fn get_all_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, Error>;

    /// Cells of column `col`, top to bottom, with trailing empty cells removed.
    fn col_values(&self, worksheet: &str, col: usize) -> Result<Vec<String>, Error> {
        let index = col.checked_sub(1).ok_or(Error::InvalidIndex(col))?;
        let mut column = self
            .get_all_values(worksheet)?
            .into_iter()
            .map(|row| row.into_iter().nth(index).unwrap_or_default())
            .collect::<Vec<_>>();
        while column.last().map_or(false, |cell| cell.is_empty()) {
            column.pop();
        }
        Ok(column)
    }

    /// Cells of row `row`; empty when the row does not exist.
    fn row_values(&self, worksheet: &str, row: usize) -> Result<Vec<String>, Error> {
        let index = row.checked_sub(1).ok_or(Error::InvalidIndex(row))?;
        Ok(self
            .get_all_values(worksheet)?
            .into_iter()
            .nth(index)
            .unwrap_or_default())
    }
}

/// Spreadsheet held entirely in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryWorkbook {
    worksheets: BTreeMap<String, Vec<Vec<String>>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a worksheet holding `rows`.
    pub fn with_worksheet<R, C>(mut self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: ToString,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.worksheets.insert(name.to_string(), rows);
        self
    }

    pub fn worksheet(&self, name: &str) -> Option<&[Vec<String>]> {
        self.worksheets.get(name).map(Vec::as_slice)
    }
}

impl Spreadsheet for MemoryWorkbook {
    fn append_row(&mut self, worksheet: &str, cells: &[String]) -> Result<(), Error> {
        self.worksheets
            .get_mut(worksheet)
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))?
            .push(cells.to_vec());
        Ok(())
    }

    fn get_all_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, Error> {
        self.worksheets
            .get(worksheet)
            .cloned()
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))
    }
}
