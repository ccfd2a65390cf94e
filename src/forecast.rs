use itertools::Itertools;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::{
    error::Error,
    record::{Record, CATEGORY_COUNT},
    worksheet::SURPLUS,
};

/// How many of the most recent sales entries feed the stock forecast.
pub const HISTORY_DEPTH: usize = 5;

/// Stock left over after `sales`; negative entries mean demand exceeded stock.
pub fn surplus(stock: Record, sales: Record) -> Result<Record, Error> {
    stock.try_sub(sales, SURPLUS)
}

/// Arithmetic mean rounded to the nearest integer, ties to even.
/// `None` for an empty slice.
pub fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().map(Decimal::from).sum();
    sum.checked_div(Decimal::from(values.len()))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
}

/// Forecast stock row: the rounded mean of each category's recent sales.
/// Columns are indexed from 1 in errors, matching worksheet numbering.
pub fn average_stock(columns: &[Vec<i64>; CATEGORY_COUNT]) -> Result<Record, Error> {
    let mut forecast = [0; CATEGORY_COUNT];
    for (index, (slot, column)) in forecast.iter_mut().zip(columns).enumerate() {
        *slot = rounded_mean(column).ok_or(Error::InsufficientHistory(index + 1))?;
    }
    Ok(Record::new(forecast))
}

/// Forecast quantities labelled with the stock worksheet headings, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockValues(Vec<(String, i64)>);

impl StockValues {
    /// Pair headings with quantities by position; whichever side is longer is cut short.
    /// A repeated heading keeps its first position and takes the later quantity.
    pub fn new(headings: &[String], forecast: &Record) -> Self {
        let mut pairs: Vec<(String, i64)> = Vec::with_capacity(headings.len());
        for (heading, quantity) in headings.iter().zip(forecast.iter()) {
            match pairs.iter_mut().find(|(name, _)| name == heading) {
                Some((_, existing)) => *existing = quantity,
                None => pairs.push((heading.clone(), quantity)),
            }
        }
        StockValues(pairs)
    }

    pub fn get(&self, heading: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|(name, _)| name == heading)
            .map(|(_, quantity)| *quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, quantity)| (name.as_str(), *quantity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for StockValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter()
                .format_with(", ", |(name, quantity), f| f(&format_args!(
                    "'{}': {}",
                    name, quantity
                )))
        )
    }
}
