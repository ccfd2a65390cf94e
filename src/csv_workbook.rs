use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, trace};

use crate::{error::Error, worksheet::Spreadsheet};

/// A spreadsheet stored as a directory of `<worksheet>.csv` files.
/// Files have no header record; the heading row is just the first row.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Io(format!(
                "workbook directory `{}` does not exist",
                dir.display()
            )));
        }
        Ok(CsvWorkbook {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, worksheet: &str) -> Result<PathBuf, Error> {
        let path = self.dir.join(format!("{}.csv", worksheet));
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::WorksheetNotFound(worksheet.to_string()))
        }
    }
}

/// Whether the file is non-empty and its last byte isn't a line terminator.
fn lacks_final_newline(file: &mut File) -> Result<bool, Error> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl Spreadsheet for CsvWorkbook {
    fn append_row(&mut self, worksheet: &str, cells: &[String]) -> Result<(), Error> {
        let path = self.path(worksheet)?;
        let mut file = OpenOptions::new().read(true).append(true).open(&path)?;
        if lacks_final_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file);
        writer.write_record(cells)?;
        writer.flush()?;
        debug!("appended {:?} to {}", cells, path.display());
        Ok(())
    }

    fn get_all_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, Error> {
        let path = self.path(worksheet)?;
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let rows = rdr
            .into_records()
            .map(|record| Ok(record?.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, Error>>()?;
        trace!("read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}
