//! Google Sheets v4 backend.
//!
//! Talks to the `values.get` and `values.append` REST endpoints with a
//! caller-supplied OAuth access token; obtaining the token is left to the
//! caller (e.g. `gcloud auth print-access-token`).

use log::{debug, trace};
use reqwest::{
    blocking::{Client, Response},
    StatusCode, Url,
};
use serde::{Deserialize, Serialize};

use crate::{error::Error, worksheet::Spreadsheet};

pub const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone, Copy)]
enum Dimension {
    Rows,
    Columns,
}

impl Dimension {
    fn as_str(self) -> &'static str {
        match self {
            Dimension::Rows => "ROWS",
            Dimension::Columns => "COLUMNS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleSheets {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheets {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        GoogleSheets {
            http: Client::new(),
            base_url: API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at a different API root (a proxy or an emulator).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn range_url(&self, range: &str, suffix: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Backend(format!("invalid API url: {}", e)))?;
        let target = format!("{}{}", range, suffix);
        url.path_segments_mut()
            .map_err(|_| Error::Backend(format!("invalid API url: {}", self.base_url)))?
            .pop_if_empty()
            .extend([self.spreadsheet_id.as_str(), "values", target.as_str()]);
        Ok(url)
    }

    /// `values.append` target; cells are stored as sent, never reinterpreted as formulas or dates.
    fn append_url(&self, worksheet: &str) -> Result<Url, Error> {
        let mut url = self.range_url(&sheet_range(worksheet), ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    fn get_range(
        &self,
        worksheet: &str,
        range: &str,
        dimension: Dimension,
    ) -> Result<Vec<Vec<String>>, Error> {
        let mut url = self.range_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("majorDimension", dimension.as_str());
        trace!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?;
        let body: ValueRange = check(response, worksheet)?.json()?;
        Ok(body.values)
    }
}

/// Turn an error response into an `Error`, keeping the API's message.
fn check(response: Response, worksheet: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorBody>()
        .map(|body| body.error.message)
        .unwrap_or_else(|_| status.to_string());
    if status == StatusCode::BAD_REQUEST && message.starts_with("Unable to parse range") {
        return Err(Error::WorksheetNotFound(worksheet.to_string()));
    }
    Err(Error::Backend(format!("{}: {}", status, message)))
}

/// A1-notation reference to a whole worksheet, quoted when the name needs it.
fn sheet_range(worksheet: &str) -> String {
    if worksheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        worksheet.to_string()
    } else {
        format!("'{}'", worksheet.replace('\'', "''"))
    }
}

/// Column letters for a 1-based column index: 1 -> A, 26 -> Z, 27 -> AA.
fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

impl Spreadsheet for GoogleSheets {
    fn append_row(&mut self, worksheet: &str, cells: &[String]) -> Result<(), Error> {
        let url = self.append_url(worksheet)?;
        trace!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&AppendBody { values: [cells] })
            .send()?;
        check(response, worksheet)?;
        debug!("appended {:?} to worksheet {}", cells, worksheet);
        Ok(())
    }

    fn get_all_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, Error> {
        self.get_range(worksheet, &sheet_range(worksheet), Dimension::Rows)
    }

    fn col_values(&self, worksheet: &str, col: usize) -> Result<Vec<String>, Error> {
        if col == 0 {
            return Err(Error::InvalidIndex(col));
        }
        let letter = column_letter(col);
        let range = format!("{}!{}:{}", sheet_range(worksheet), letter, letter);
        let columns = self.get_range(worksheet, &range, Dimension::Columns)?;
        Ok(columns.into_iter().next().unwrap_or_default())
    }

    fn row_values(&self, worksheet: &str, row: usize) -> Result<Vec<String>, Error> {
        if row == 0 {
            return Err(Error::InvalidIndex(row));
        }
        let range = format!("{}!{}:{}", sheet_range(worksheet), row, row);
        let rows = self.get_range(worksheet, &range, Dimension::Rows)?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }
}
