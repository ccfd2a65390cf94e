use std::io::Write;

use log::info;

use crate::{
    error::Error,
    forecast::{self, StockValues, HISTORY_DEPTH},
    record::{Record, CATEGORY_COUNT},
    worksheet::{Spreadsheet, SALES, STOCK, SURPLUS},
};

/// Drives one market session against a spreadsheet,
/// reporting progress to `out`.
#[derive(Debug)]
pub struct Automation<S, W> {
    sheet: S,
    out: W,
    // worksheets appended to during the current run
    completed: Vec<String>,
}

impl<S: Spreadsheet, W: Write> Automation<S, W> {
    pub fn new(sheet: S, out: W) -> Self {
        Automation {
            sheet,
            out,
            completed: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (S, W) {
        (self.sheet, self.out)
    }

    /// Append `record` as a new row of `worksheet`
    pub fn update_worksheet(&mut self, worksheet: &str, record: &Record) -> Result<(), Error> {
        writeln!(self.out, "Updating {} worksheet...\n", worksheet)?;
        self.sheet.append_row(worksheet, &record.to_cells())?;
        self.completed.push(worksheet.to_string());
        info!("appended {} to {}", record, worksheet);
        writeln!(self.out, "{} worksheet updated successfully.\n", worksheet)?;
        Ok(())
    }

    /// Current stock is the last row of the stock worksheet; the first row holds headings.
    pub fn latest_stock(&self) -> Result<Record, Error> {
        let rows = self.sheet.get_all_values(STOCK)?;
        match rows.len() {
            0 | 1 => Err(Error::MissingRows(STOCK.to_string())),
            len => Record::from_cells(STOCK, len, &rows[len - 1]),
        }
    }

    /// Compare `sales` with the latest stock
    pub fn calculate_surplus_data(&mut self, sales: Record) -> Result<Record, Error> {
        writeln!(self.out, "Calculating surplus data...\n")?;
        let stock = self.latest_stock()?;
        forecast::surplus(stock, sales)
    }

    /// The last `HISTORY_DEPTH` entries of every sales column, heading excluded.
    /// Shorter histories yield shorter columns.
    pub fn last_sales_entries(&self) -> Result<[Vec<i64>; CATEGORY_COUNT], Error> {
        let mut columns: [Vec<i64>; CATEGORY_COUNT] = Default::default();
        for (index, column) in columns.iter_mut().enumerate() {
            let col = index + 1;
            let cells = self.sheet.col_values(SALES, col)?;
            let data = cells.get(1..).unwrap_or_default();
            let start = data.len().saturating_sub(HISTORY_DEPTH);
            *column = data[start..]
                .iter()
                .enumerate()
                .map(|(offset, cell)| {
                    cell.trim().parse::<i64>().map_err(|_| Error::InvalidCell {
                        worksheet: SALES.to_string(),
                        // +1 for the heading row, +1 for 1-based numbering
                        row: start + offset + 2,
                        column: col,
                        value: cell.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
        }
        Ok(columns)
    }

    pub fn calculate_stock_data(
        &mut self,
        columns: &[Vec<i64>; CATEGORY_COUNT],
    ) -> Result<Record, Error> {
        writeln!(self.out, "Calculating stock data...\n")?;
        forecast::average_stock(columns)
    }

    /// Label the forecast with the stock worksheet's headings
    pub fn stock_values(&self, forecast: &Record) -> Result<StockValues, Error> {
        let headings = self.sheet.row_values(STOCK, 1)?;
        Ok(StockValues::new(&headings, forecast))
    }

    /// Record `sales`, then derive and record surplus and the next stock forecast.
    ///
    /// Steps are not atomic. If a step fails after at least one worksheet has been
    /// appended to, the error is wrapped in `Error::PartialUpdate` listing those worksheets.
    pub fn run(&mut self, sales: Record) -> Result<StockValues, Error> {
        self.completed.clear();
        self.run_steps(sales).map_err(|source| {
            if self.completed.is_empty() {
                source
            } else {
                Error::PartialUpdate {
                    completed: std::mem::take(&mut self.completed),
                    source: Box::new(source),
                }
            }
        })
    }

    fn run_steps(&mut self, sales: Record) -> Result<StockValues, Error> {
        self.update_worksheet(SALES, &sales)?;

        let surplus = self.calculate_surplus_data(sales)?;
        writeln!(self.out, "Surplus data calculated successfully.\n")?;
        self.update_worksheet(SURPLUS, &surplus)?;

        let columns = self.last_sales_entries()?;
        let stock = self.calculate_stock_data(&columns)?;
        writeln!(self.out, "Stock data calculated successfully.\n")?;
        self.update_worksheet(STOCK, &stock)?;

        let values = self.stock_values(&stock)?;
        writeln!(
            self.out,
            "Make the following number of sandwiches for next market:\n"
        )?;
        writeln!(self.out, "{}", values)?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use crate::automation::Automation;
    use crate::error::Error;
    use crate::record::Record;
    use crate::worksheet::MemoryWorkbook;

    const HEADINGS: [&str; 6] = ["cheese", "ham", "tuna", "egg", "beef", "brie"];

    fn automation(workbook: MemoryWorkbook) -> Automation<MemoryWorkbook, Vec<u8>> {
        Automation::new(workbook, Vec::new())
    }

    fn workbook(stock: Vec<[i64; 6]>, sales: Vec<[i64; 6]>) -> MemoryWorkbook {
        let table = |rows: Vec<[i64; 6]>| {
            std::iter::once(HEADINGS.map(String::from).to_vec())
                .chain(rows.into_iter().map(|row| row.map(|v| v.to_string()).to_vec()))
                .collect::<Vec<_>>()
        };
        MemoryWorkbook::new()
            .with_worksheet("stock", table(stock))
            .with_worksheet("sales", table(sales))
            .with_worksheet("surplus", table(vec![]))
    }

    #[test]
    fn surplus_uses_last_stock_row() {
        let mut automation = automation(workbook(
            vec![[1, 1, 1, 1, 1, 1], [10, 20, 30, 40, 50, 60]],
            vec![],
        ));
        assert_eq!(
            automation.calculate_surplus_data(Record::new([1, 2, 3, 4, 5, 6])),
            Ok(Record::new([9, 18, 27, 36, 45, 54]))
        );
    }

    #[test]
    fn surplus_without_stock_history() {
        let mut automation = automation(workbook(vec![], vec![]));
        assert_eq!(
            automation.calculate_surplus_data(Record::default()),
            Err(Error::MissingRows("stock".to_string()))
        );
    }

    #[test]
    fn last_five_sales_entries() {
        let sales = (1..=7).map(|n| [n, n * 2, 0, 1, 2, 3]).collect();
        let automation = automation(workbook(vec![], sales));
        let columns = automation.last_sales_entries().unwrap();
        assert_eq!(columns[0], vec![3, 4, 5, 6, 7]);
        assert_eq!(columns[1], vec![6, 8, 10, 12, 14]);
        assert_eq!(columns[5], vec![3; 5]);
    }

    #[test]
    fn short_sales_history() {
        let automation = automation(workbook(
            vec![],
            vec![[4, 4, 4, 4, 4, 4], [5, 5, 5, 5, 5, 5]],
        ));
        let columns = automation.last_sales_entries().unwrap();
        assert!(columns.iter().all(|column| column.len() == 2));
    }

    #[test]
    fn non_numeric_sales_cell() {
        let workbook = MemoryWorkbook::new().with_worksheet(
            "sales",
            vec![
                HEADINGS.to_vec(),
                vec!["1", "2", "3", "4", "5", "6"],
                vec!["1", "2", "n/a", "4", "5", "6"],
            ],
        );
        assert_eq!(
            automation(workbook).last_sales_entries(),
            Err(Error::InvalidCell {
                worksheet: "sales".to_string(),
                row: 3,
                column: 3,
                value: "n/a".to_string()
            })
        );
    }

    #[test]
    fn full_run() {
        let mut automation = automation(workbook(
            vec![[10, 20, 30, 40, 50, 60]],
            vec![
                [10, 1, 1, 1, 1, 1],
                [12, 1, 1, 1, 1, 1],
                [11, 1, 1, 1, 1, 1],
                [13, 1, 1, 1, 1, 1],
            ],
        ));
        let values = automation.run(Record::new([9, 1, 2, 3, 4, 5])).unwrap();
        assert_eq!(
            values.iter().collect::<Vec<_>>(),
            vec![
                ("cheese", 11),
                ("ham", 1),
                ("tuna", 1),
                ("egg", 1),
                ("beef", 2),
                ("brie", 2)
            ]
        );

        let (workbook, out) = automation.into_parts();
        let last = |name: &str| workbook.worksheet(name).unwrap().last().unwrap().clone();
        assert_eq!(last("sales"), ["9", "1", "2", "3", "4", "5"]);
        assert_eq!(last("surplus"), ["1", "19", "28", "37", "46", "55"]);
        assert_eq!(last("stock"), ["11", "1", "1", "1", "2", "2"]);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("sales worksheet updated successfully."));
        assert!(out.contains("surplus worksheet updated successfully."));
        assert!(out.contains("stock worksheet updated successfully."));
        assert!(out.ends_with(
            "{'cheese': 11, 'ham': 1, 'tuna': 1, 'egg': 1, 'beef': 2, 'brie': 2}\n"
        ));
    }

    #[test]
    fn failure_before_any_update() {
        let workbook = MemoryWorkbook::new();
        assert_eq!(
            automation(workbook).run(Record::default()),
            Err(Error::WorksheetNotFound("sales".to_string()))
        );
    }

    #[test]
    fn partial_update_reported() {
        let workbook = MemoryWorkbook::new()
            .with_worksheet("sales", vec![HEADINGS.to_vec()])
            .with_worksheet("stock", vec![HEADINGS.to_vec(), vec!["1", "2", "3", "4", "5", "6"]]);
        let mut automation = automation(workbook);

        assert_eq!(
            automation.run(Record::new([1, 1, 1, 1, 1, 1])),
            Err(Error::PartialUpdate {
                completed: vec!["sales".to_string()],
                source: Box::new(Error::WorksheetNotFound("surplus".to_string())),
            })
        );
        let (workbook, _) = automation.into_parts();
        assert_eq!(workbook.worksheet("sales").unwrap().len(), 2);
        assert_eq!(workbook.worksheet("stock").unwrap().len(), 2);
    }

    #[test]
    fn surplus_overflow_reported_after_sales_update() {
        let mut automation = automation(workbook(vec![[1, 1, 1, 1, 1, 1]], vec![]));
        assert_eq!(
            automation.run(Record::new([i64::MIN, 0, 0, 0, 0, 0])),
            Err(Error::PartialUpdate {
                completed: vec!["sales".to_string()],
                source: Box::new(Error::Overflow {
                    worksheet: "surplus".to_string(),
                    column: 1
                }),
            })
        );
        let (workbook, _) = automation.into_parts();
        assert_eq!(workbook.worksheet("sales").unwrap().len(), 2);
        assert_eq!(workbook.worksheet("surplus").unwrap().len(), 1);
    }

    /// Accepts output until it has seen `fail_on`, then refuses every write.
    struct BrokenConsole {
        written: String,
        fail_on: &'static str,
    }

    impl Write for BrokenConsole {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.contains(self.fail_on) {
                return Err(io::Error::new(io::ErrorKind::Other, "console closed"));
            }
            self.written.push_str(&String::from_utf8_lossy(buf));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn append_counted_even_if_console_fails() {
        let console = BrokenConsole {
            written: String::new(),
            fail_on: "Updating sales worksheet",
        };
        let mut automation =
            Automation::new(workbook(vec![[1, 1, 1, 1, 1, 1]], vec![]), console);
        assert_eq!(
            automation.run(Record::new([1, 1, 1, 1, 1, 1])),
            Err(Error::PartialUpdate {
                completed: vec!["sales".to_string()],
                source: Box::new(Error::Io("console closed".to_string())),
            })
        );
        let (workbook, _) = automation.into_parts();
        assert_eq!(workbook.worksheet("sales").unwrap().len(), 2);
    }
}
