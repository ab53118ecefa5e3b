use std::collections::HashSet;
use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1},
    combinator::{eof, map_res},
    sequence::{delimited, terminated},
    IResult,
};
use serde_json::Value;

use crate::table::{Column, Table};

/// A parsed column header: plain `name`, or `name[i]` for one cell of a tensor column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRef {
    Scalar(String),
    Cell(String, usize),
}

fn cell_header(input: &str) -> IResult<&str, (&str, usize)> {
    let (input, name) = take_till1(|c| c == '[')(input)?;
    let (input, idx) = terminated(
        delimited(char('['), map_res(digit1, str::parse::<usize>), char(']')),
        eof,
    )(input)?;
    Ok((input, (name, idx)))
}

/// Parse a header; anything that is not `name[digits]` is a plain column name.
pub fn parse_header(header: &str) -> HeaderRef {
    let header = header.trim();
    match cell_header(header) {
        Ok((_, (name, idx))) if !name.trim().is_empty() => HeaderRef::Cell(name.trim().to_string(), idx),
        _ => HeaderRef::Scalar(header.to_string()),
    }
}

/// Output column being assembled from one or more source fields
enum ColumnPlan {
    Scalar { name: String, field: usize },
    Tensor { name: String, cells: Vec<(usize, usize)> },
}

impl ColumnPlan {
    fn name(&self) -> &str {
        match self {
            ColumnPlan::Scalar { name, .. } | ColumnPlan::Tensor { name, .. } => name,
        }
    }
}

fn plan_columns(headers: &[String]) -> Result<Vec<ColumnPlan>> {
    let mut plans: Vec<ColumnPlan> = Vec::new();
    for (field, header) in headers.iter().enumerate() {
        match parse_header(header) {
            HeaderRef::Scalar(name) => plans.push(ColumnPlan::Scalar { name, field }),
            HeaderRef::Cell(name, cell) => {
                let existing = plans.iter_mut().find_map(|p| match p {
                    ColumnPlan::Tensor { name: n, cells } if *n == name => Some(cells),
                    _ => None,
                });
                match existing {
                    Some(cells) => {
                        if cells.iter().any(|(c, _)| *c == cell) {
                            bail!("Duplicate tensor cell header '{}'", header);
                        }
                        cells.push((cell, field));
                    }
                    None => plans.push(ColumnPlan::Tensor {
                        name,
                        cells: vec![(cell, field)],
                    }),
                }
            }
        }
    }

    {
        let mut seen = HashSet::new();
        for plan in &plans {
            if !seen.insert(plan.name()) {
                bail!("Duplicate column name '{}'", plan.name());
            }
        }
    }
    Ok(plans)
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

/// Build a table from header names and string rows.
///
/// A column is numeric when every non-empty value parses as a number (empty values
/// become NaN); otherwise it holds strings. `name[i]` headers are gathered into one
/// tensor column `name` with `max(i) + 1` cells.
pub fn table_from_records(headers: &[String], rows: &[Vec<String>]) -> Result<Table> {
    if rows.is_empty() {
        bail!("Input must contain at least one data row");
    }

    let mut table = Table::new();
    for plan in plan_columns(headers)? {
        let column = match plan {
            ColumnPlan::Scalar { name, field } => {
                let raw: Vec<&str> = rows
                    .iter()
                    .map(|r| r.get(field).map(String::as_str).unwrap_or(""))
                    .collect();
                let has_value = raw.iter().any(|s| !s.trim().is_empty());
                let numbers: Option<Vec<f64>> = raw.iter().map(|s| parse_number(s)).collect();
                match numbers {
                    Some(values) if has_value => Column::float(name, values),
                    _ => Column::string(name, raw.into_iter().map(str::to_string).collect()),
                }
            }
            ColumnPlan::Tensor { name, cells } => {
                let ncells = cells.iter().map(|(c, _)| c + 1).max().unwrap_or(1);
                let mut values = vec![f64::NAN; rows.len() * ncells];
                for (ri, row) in rows.iter().enumerate() {
                    for &(cell, field) in &cells {
                        let raw = row.get(field).map(String::as_str).unwrap_or("");
                        let v = parse_number(raw).ok_or_else(|| {
                            anyhow!(
                                "Non-numeric value '{}' in tensor column '{}' (row {})",
                                raw,
                                name,
                                ri + 1
                            )
                        })?;
                        values[ri * ncells + cell] = v;
                    }
                }
                Column::tensor(name.clone(), ncells, values)
                    .with_context(|| format!("Invalid tensor column '{}'", name))?
            }
        };
        table.add_column(column)?;
    }
    Ok(table)
}

/// Read a CSV document (with header row) into a table
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", i + 1))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    table_from_records(&headers, &rows)
}

/// Text form of one JSON field; `null` and absent fields are empty (NaN when numeric)
fn json_field(row: usize, key: &str, value: Option<&Value>) -> Result<String> {
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => bail!("Nested value in field '{}' (record {})", key, row + 1),
    })
}

/// Build a table from a JSON array of records; keys of the first record name the columns.
pub fn from_json(value: &Value) -> Result<Table> {
    let records = value
        .as_array()
        .ok_or_else(|| anyhow!("JSON input must be an array of records"))?;
    let objects = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .ok_or_else(|| anyhow!("JSON record {} is not an object", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let headers: Vec<String> = match objects.first() {
        Some(first) => first.keys().cloned().collect(),
        None => bail!("Input must contain at least one data row"),
    };
    let rows = objects
        .iter()
        .enumerate()
        .map(|(i, obj)| {
            headers
                .iter()
                .map(|key| json_field(i, key, obj.get(key)))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    table_from_records(&headers, &rows)
}

/// Read a JSON document (array of records) into a table
pub fn read_json<R: Read>(reader: R) -> Result<Table> {
    let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON input")?;
    from_json(&value)
}
