pub mod automation;
pub mod csv_workbook;
pub mod error;
pub mod forecast;
pub mod input;
pub mod parser;
pub mod record;
pub mod sheets;
pub mod worksheet;
