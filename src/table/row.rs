use super::header::{positional_name, HeaderSet};
use crate::dom::{RawCell, RawRow};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Cell texts of a rendered row, in column order. `None` for a row without
/// cells, which is not a data row.
pub fn sample_row(raw: &RawRow) -> Option<Vec<String>> {
    if raw.cells.is_empty() {
        return None;
    }
    Some(raw.cells.iter().map(cell_text).collect())
}

/// Rendered text if there is any, then default text, then nothing.
fn cell_text(cell: &RawCell) -> String {
    cell.inner_text
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(cell.text.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// How rows are keyed when deduplicating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// First two cells. Rows sharing both leading values collapse into one.
    #[default]
    Leading,
    /// Every cell.
    FullRow,
}

/// Deduplication key of a sampled row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowIdentity(Vec<String>);

impl RowIdentity {
    pub fn of(cells: &[String], mode: IdentityMode) -> Self {
        match mode {
            IdentityMode::Leading => Self(
                (0..2)
                    .map(|i| cells.get(i).cloned().unwrap_or_default())
                    .collect(),
            ),
            IdentityMode::FullRow => Self(cells.to_vec()),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

/// Whether a row is keyed by header names or by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    Named,
    Positional,
}

/// A collected row: column name to cell text, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    shape: RowShape,
    fields: Vec<(String, String)>,
}

impl Row {
    /// Key `cells` by `headers` when the widths agree, by `col_<i>` otherwise.
    pub fn from_cells(cells: Vec<String>, headers: &HeaderSet) -> Self {
        if !headers.is_empty() && headers.len() == cells.len() {
            Self {
                shape: RowShape::Named,
                fields: headers.iter().map(str::to_string).zip(cells).collect(),
            }
        } else {
            Self {
                shape: RowShape::Positional,
                fields: cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (positional_name(i), v))
                    .collect(),
            }
        }
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
