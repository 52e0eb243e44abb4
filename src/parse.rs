use std::{fs, path::Path, str::FromStr};

use derive_more::Display;
use log::debug;

use crate::problem::{Customer, Depot, Point, Problem, ProblemConstructionError};

#[derive(Debug, Display)]
pub enum ParseError {
    #[display(fmt = "{}", _0)]
    Io(std::io::Error),
    #[display(fmt = "unexpected end of file, expected {}", _0)]
    UnexpectedEof(&'static str),
    #[display(fmt = "line {}: malformed header, expected `m n t`", _0)]
    MalformedHeader(usize),
    #[display(fmt = "line {}: missing {}", line, field)]
    MissingField { line: usize, field: &'static str },
    #[display(fmt = "line {}: invalid {} `{}`", line, field, token)]
    InvalidNumber {
        line: usize,
        field: &'static str,
        token: String,
    },
    #[display(fmt = "{}", _0)]
    Problem(ProblemConstructionError),
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io(err)
    }
}

impl From<ProblemConstructionError> for ParseError {
    fn from(err: ProblemConstructionError) -> Self {
        ParseError::Problem(err)
    }
}

/// The non-blank lines of a file, with their 1-based line numbers
struct Lines<'a> {
    inner: Box<dyn Iterator<Item = (usize, Vec<&'a str>)> + 'a>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: Box::new(
                text.lines()
                    .enumerate()
                    .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
                    .filter(|(_, tokens)| !tokens.is_empty()),
            ),
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<Record<'a>, ParseError> {
        let (line, tokens) = self.inner.next().ok_or(ParseError::UnexpectedEof(expected))?;
        Ok(Record { line, tokens })
    }
}

struct Record<'a> {
    line: usize,
    tokens: Vec<&'a str>,
}

impl<'a> Record<'a> {
    fn field<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T, ParseError> {
        let token = self.tokens.get(index).ok_or(ParseError::MissingField {
            line: self.line,
            field,
        })?;

        token.parse().map_err(|_| ParseError::InvalidNumber {
            line: self.line,
            field,
            token: token.to_string(),
        })
    }
}

/// Parse an instance in the Cordeau MDVRP format:
///
/// * a header `m n t`: vehicles per depot, customers and depots. A leading problem type is allowed, as in `type m n t`.
/// * `t` lines `D Q`: the maximum route duration (0 for none) and vehicle capacity of each depot.
/// * `n` lines `i x y d q ...`: customer id, coordinates, service duration and demand. Trailing columns are ignored.
/// * `t` lines `i x y ...`: depot id and coordinates.
///
/// Customers are assigned to their nearest depot.
pub fn parse_instance(text: &str) -> Result<Problem, ParseError> {
    let mut lines = Lines::new(text);

    let header = lines.next("header")?;
    let offset = match header.tokens.len() {
        3 => 0,
        4 => 1,
        _ => return Err(ParseError::MalformedHeader(header.line)),
    };
    let vehicles: usize = header.field(offset, "vehicle count")?;
    let customer_count: usize = header.field(offset + 1, "customer count")?;
    let depot_count: usize = header.field(offset + 2, "depot count")?;
    debug!(
        "Parsing {} depots with {} vehicles each, and {} customers",
        depot_count, vehicles, customer_count
    );

    let mut limits = Vec::with_capacity(depot_count);
    for _ in 0..depot_count {
        let record = lines.next("depot limits")?;
        let max_duration: f64 = record.field(0, "maximum duration")?;
        let max_load: u32 = record.field(1, "maximum load")?;
        limits.push((max_duration, max_load));
    }

    let mut customers = Vec::with_capacity(customer_count);
    for _ in 0..customer_count {
        let record = lines.next("customer")?;
        customers.push(Customer::new(
            record.field(0, "customer id")?,
            Point::new(record.field(1, "x")?, record.field(2, "y")?),
            record.field(3, "service duration")?,
            record.field(4, "demand")?,
        ));
    }

    let mut depots = Vec::with_capacity(depot_count);
    for (max_duration, max_load) in limits {
        let record = lines.next("depot")?;
        depots.push(Depot::new(
            record.field(0, "depot id")?,
            Point::new(record.field(1, "x")?, record.field(2, "y")?),
            max_load,
            max_duration,
            vehicles,
        ));
    }

    Ok(Problem::assign_to_nearest_depot(depots, customers)?)
}

pub fn read_instance(path: impl AsRef<Path>) -> Result<Problem, ParseError> {
    parse_instance(&fs::read_to_string(path)?)
}

/// Parse a solution file, where the first value is the total duration of the best known solution.
pub fn parse_benchmark(text: &str) -> Result<f64, ParseError> {
    Lines::new(text).next("benchmark")?.field(0, "benchmark")
}

pub fn read_benchmark(path: impl AsRef<Path>) -> Result<f64, ParseError> {
    parse_benchmark(&fs::read_to_string(path)?)
}
