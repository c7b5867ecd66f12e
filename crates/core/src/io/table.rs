//! Flat tables written as CSV

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    /// Missing value, written as an empty field
    Empty,
}

impl Cell {
    fn render(&self, out: &mut String) {
        match self {
            Cell::Int(v) => {
                let _ = write!(out, "{}", v);
            }
            Cell::Float(v) if v.is_finite() => {
                let _ = write!(out, "{}", v);
            }
            Cell::Float(_) | Cell::Empty => {}
            Cell::Text(s) => {
                if s.contains([',', '"', '\n', '\r']) {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                } else {
                    out.push_str(s);
                }
            }
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int(v as i64)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Cell::Int(v as i64)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// Header plus rows of equal width
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Errors
    /// [`Error::Other`] if the row width differs from the header width.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::Other(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Render as CSV text with a header line
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        let header: Vec<Cell> = self.headers.iter().map(|h| Cell::Text(h.clone())).collect();
        for row in std::iter::once(&header).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                cell.render(&mut out);
            }
            out.push('\n');
        }
        out
    }

    /// Write as a CSV file, creating parent directories
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::write_text(self.to_csv_string(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rendering() {
        let mut t = Table::new(["id", "value", "label"]);
        t.push_row(vec![Cell::from(1_i64), Cell::from(2.5), Cell::from("plain")])
            .unwrap();
        t.push_row(vec![Cell::from(2_i64), Cell::from(f64::NAN), Cell::from("a,\"b\"")])
            .unwrap();
        t.push_row(vec![Cell::from(3_i64), Cell::from(None::<f64>), Cell::Empty])
            .unwrap();

        assert_eq!(
            t.to_csv_string(),
            "id,value,label\n1,2.5,plain\n2,,\"a,\"\"b\"\"\"\n3,,\n"
        );
        assert_eq!(t.num_rows(), 3);
    }

    #[test]
    fn test_width_mismatch() {
        let mut t = Table::new(["a", "b"]);
        assert!(t.push_row(vec![Cell::Empty]).is_err());
    }
}
