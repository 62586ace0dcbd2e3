use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::io::{self, Read};

use crate::array::ArrayData;

#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv(io::stdin())
}

pub fn read_csv<R: Read>(source: R) -> Result<CsvData> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(anyhow!("CSV must contain at least one data row"));
    }

    Ok(CsvData { headers, rows })
}

pub fn parse_column_selector(input: &str) -> ColumnSelector {
    match input.parse::<usize>() {
        Ok(index) => ColumnSelector::Index(index),
        Err(_) => ColumnSelector::Name(input.to_string()),
    }
}

fn column_index(data: &CsvData, selector: ColumnSelector) -> Result<(usize, String)> {
    match selector {
        ColumnSelector::Index(idx) => {
            if idx >= data.headers.len() {
                return Err(anyhow!(
                    "Column index {} out of bounds (available columns: {})",
                    idx,
                    data.headers.len()
                ));
            }
            Ok((idx, data.headers[idx].clone()))
        }
        ColumnSelector::Name(name) => {
            let idx = data
                .headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(&name))
                .ok_or_else(|| {
                    anyhow!(
                        "Column '{}' not found. Available columns: {}",
                        name,
                        data.headers.join(", ")
                    )
                })?;
            Ok((idx, data.headers[idx].clone()))
        }
    }
}

/// Raw cells of one column.
pub fn extract_column_as_string(data: &CsvData, selector: ColumnSelector) -> Result<(String, Vec<String>)> {
    let (column_index, column_name) = column_index(data, selector)?;

    let mut values = Vec::new();
    for (row_idx, row) in data.rows.iter().enumerate() {
        let cell = row.get(column_index).ok_or_else(|| {
            anyhow!(
                "Row {} has only {} columns, expected at least {}",
                row_idx + 1,
                row.len(),
                column_index + 1
            )
        })?;
        values.push(cell.clone());
    }

    Ok((column_name, values))
}

/// One column as numbers, failing on the first cell that is not one.
pub fn extract_column(data: &CsvData, selector: ColumnSelector) -> Result<(String, Vec<f64>)> {
    let (column_name, cells) = extract_column_as_string(data, selector)?;
    let values = cells
        .iter()
        .enumerate()
        .map(|(row_idx, cell)| {
            cell.trim().parse::<f64>().with_context(|| {
                format!(
                    "Failed to parse value '{}' as number in column '{}' at row {}",
                    cell,
                    column_name,
                    row_idx + 1
                )
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok((column_name, values))
}

/// One column as a typed array: float64 when every cell is numeric, str otherwise.
pub fn column_array(data: &CsvData, selector: ColumnSelector) -> Result<(String, ArrayData)> {
    let (column_name, cells) = extract_column_as_string(data, selector)?;
    let numbers: Option<Vec<f64>> = cells.iter().map(|c| c.trim().parse::<f64>().ok()).collect();
    let array = match numbers {
        Some(values) => ArrayData::floats(values),
        None => ArrayData::strings(cells),
    };
    Ok((column_name, array))
}
