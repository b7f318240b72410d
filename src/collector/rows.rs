use crate::table::{HeaderSet, IdentityMode, Row, RowIdentity};
use std::collections::HashSet;

/// Rows collected so far and the identities already seen. Only grows.
#[derive(Debug)]
pub struct RowSet {
    mode: IdentityMode,
    seen: HashSet<RowIdentity>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(mode: IdentityMode) -> Self {
        Self {
            mode,
            seen: HashSet::new(),
            rows: Vec::new(),
        }
    }

    /// Add the rows whose identity hasn't been seen, in sample order.
    /// Returns how many were added.
    pub fn merge<I>(&mut self, samples: I, headers: &HeaderSet) -> usize
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let before = self.rows.len();
        for cells in samples {
            if self.seen.insert(RowIdentity::of(&cells, self.mode)) {
                self.rows.push(Row::from_cells(cells, headers));
            }
        }
        self.rows.len() - before
    }

    /// Number of distinct identities, which is also the number of rows.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
