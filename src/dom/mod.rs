//! The slice of the page the collector needs.
//!
//! Everything that touches the live document goes through [`DomAccess`], so
//! the scroll loop, the container walk and the row sampler can be driven by a
//! simulated table in tests. [`PageDom`] is the real implementation on top of
//! an `eoka::Page`.

mod page;

pub use page::PageDom;

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// One `<td>` as read from the page. Either read may be missing if the cell
/// could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCell {
    /// Rendered text (`innerText`), includes clipped content.
    pub inner_text: Option<String>,
    /// Default text (`textContent`).
    pub text: Option<String>,
}

impl RawCell {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            inner_text: Some(text.clone()),
            text: Some(text),
        }
    }

    /// A cell neither read succeeded on.
    pub fn unreadable() -> Self {
        Self::default()
    }
}

/// One rendered `<tr>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: texts.into_iter().map(RawCell::new).collect(),
        }
    }
}

/// Layout of one ancestor of the table, as seen by the container walk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AncestorLayout {
    /// Lowercase tag name, for logging.
    pub tag: String,
    pub scroll_height: u64,
    pub client_height: u64,
    /// Computed `overflow-y`.
    pub overflow_y: String,
}

/// Handle to the scroll container: how many steps above the table's parent it
/// sits (0 is the parent itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    pub depth: usize,
}

/// Live scroll dimensions of the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: u64,
    pub scroll_height: u64,
    pub client_height: u64,
}

/// Read/write access to the table and its surroundings.
///
/// All methods address "the table" as the first `<table>` in the document.
#[async_trait(?Send)]
pub trait DomAccess {
    /// Wait up to `timeout_ms` for a table to be attached. `Ok(false)` if it
    /// never shows up.
    async fn wait_for_table(&self, timeout_ms: u64) -> Result<bool>;

    /// Raw texts of the `thead th` cells, `None` if there is no header row.
    async fn header_cells(&self) -> Result<Option<Vec<String>>>;

    /// Number of `td` cells in the table's first row, `None` without rows.
    async fn first_row_width(&self) -> Result<Option<usize>>;

    /// Layout of every ancestor of the table, starting at its parent and
    /// ending at the document root.
    async fn table_ancestors(&self) -> Result<Vec<AncestorLayout>>;

    /// Current dimensions of the container.
    async fn scroll_metrics(&self, container: ContainerRef) -> Result<ScrollMetrics>;

    /// Set the container's `scrollTop`.
    async fn set_scroll_top(&self, container: ContainerRef, offset: u64) -> Result<()>;

    /// Scroll the container down by one client height, relative to where it is.
    async fn scroll_by_page(&self, container: ContainerRef) -> Result<()>;

    /// Every data row currently in the document.
    async fn rendered_rows(&self) -> Result<Vec<RawRow>>;

    /// Text of a "Showing N of M results" style indicator, if the page has one.
    async fn results_indicator(&self) -> Result<Option<String>>;
}
