use std::io::{BufRead, Write};

use log::debug;

use crate::{error::Error, parser::parse_sales, record::Record};

const INSTRUCTIONS: &str = "Please enter sales data from the last market.
Data should be six numbers, separated by commas.
Example: 10,20,30,40,50,60
";

/// Prompt on `output` until `input` yields a valid sales line.
/// Invalid lines are reported and the prompt is repeated; there is no retry limit.
pub fn collect_sales<R, W>(mut input: R, mut output: W) -> Result<Record, Error>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(output, "{}", INSTRUCTIONS)?;
        write!(output, "Enter your data here: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }

        match parse_sales(&line) {
            Ok(sales) => {
                writeln!(output, "Data is valid!")?;
                return Ok(sales);
            }
            Err(error) => {
                debug!("rejected sales input {:?}: {}", line.trim_end(), error);
                writeln!(output, "Invalid data: {}, please try again.\n", error)?;
            }
        }
    }
}
