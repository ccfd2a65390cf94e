use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use market_stock::{
    automation::Automation, csv_workbook::CsvWorkbook, error::Error, forecast::StockValues,
    input::collect_sales, parser::parse_sales, sheets::GoogleSheets, worksheet::Spreadsheet,
};

/// Record market sales and forecast the stock to make for the next market
#[derive(Parser)]
#[clap(version)]
struct Cli {
    /// Directory holding sales.csv, stock.csv and surplus.csv
    #[clap(long)]
    workbook: Option<PathBuf>,

    /// Google Sheets spreadsheet ID
    #[clap(long, conflicts_with = "workbook")]
    spreadsheet_id: Option<String>,

    /// OAuth access token for the Sheets API
    #[clap(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Sales figures as six comma-separated integers; prompts when omitted
    #[clap(long)]
    sales: Option<String>,
}

/// A `--sales` value is validated once; only the interactive prompt retries.
fn run<S, W>(sheet: S, sales: Option<String>, mut out: W) -> Result<StockValues, Error>
where
    S: Spreadsheet,
    W: Write,
{
    let sales = match sales {
        Some(line) => parse_sales(&line)?,
        None => collect_sales(io::stdin().lock(), &mut out)?,
    };
    Automation::new(sheet, out).run(sales)
}

fn session(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match (cli.workbook, cli.spreadsheet_id) {
        (Some(dir), _) => {
            run(CsvWorkbook::open(dir)?, cli.sales, io::stdout())?;
        }
        (None, Some(id)) => {
            let token = cli.access_token.ok_or(
                "--access-token (or GOOGLE_ACCESS_TOKEN) is required with --spreadsheet-id",
            )?;
            run(GoogleSheets::new(id, token), cli.sales, io::stdout())?;
        }
        (None, None) => return Err("either --workbook or --spreadsheet-id is required".into()),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!("Welcome to Love Sandwiches Data Automation\n");

    if let Err(error) = session(cli) {
        eprintln!("Market session failed: {}", error);
        std::process::exit(1);
    }
}
