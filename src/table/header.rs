use crate::dom::DomAccess;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Synthesized name for the column at `index`.
pub fn positional_name(index: usize) -> String {
    format!("col_{}", index)
}

/// Ordered column names of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    columns: Vec<String>,
}

impl HeaderSet {
    /// Names from header cell texts; blank cells become `col_<index>`.
    /// Names are unique: a repeat of an earlier name gets `_2`, `_3`, ...
    pub fn from_header_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut taken = HashSet::new();
        let columns = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = match cell.as_ref().trim() {
                    "" => positional_name(i),
                    text => text.to_string(),
                };
                let unique = if taken.contains(&name) {
                    (2..)
                        .map(|n| format!("{}_{}", name, n))
                        .find(|candidate| !taken.contains(candidate))
                        .unwrap_or_default()
                } else {
                    name
                };
                taken.insert(unique.clone());
                unique
            })
            .collect();
        Self { columns }
    }

    /// `col_0 .. col_<width-1>`.
    pub fn positional(width: usize) -> Self {
        Self {
            columns: (0..width).map(positional_name).collect(),
        }
    }

    /// Pick the header row if there is one, otherwise synthesize names from the
    /// width of the first row. Empty when neither exists.
    pub fn resolve(header_cells: Option<Vec<String>>, first_row_width: Option<usize>) -> Self {
        match (header_cells, first_row_width) {
            (Some(cells), _) => Self::from_header_cells(cells),
            (None, Some(width)) => Self::positional(width),
            (None, None) => Self::default(),
        }
    }

    /// Read the headers of the page's table, waiting up to `timeout_ms` for the
    /// table to appear.
    pub async fn extract<D: DomAccess + ?Sized>(dom: &D, timeout_ms: u64) -> Result<Self> {
        if !dom.wait_for_table(timeout_ms).await? {
            return Err(Error::TableNotFound { timeout_ms });
        }
        let cells = dom.header_cells().await?;
        let width = match cells {
            Some(_) => None,
            None => dom.first_row_width().await?,
        };
        let headers = Self::resolve(cells, width);
        debug!("headers: {}", headers);
        Ok(headers)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl fmt::Display for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.columns.join(", "))
    }
}
