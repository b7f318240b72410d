//! A simulated virtualized table for driving the collector without a browser.
//!
//! Rows have a fixed height and only those overlapping the container's
//! viewport (plus `overscan` rows either side) are rendered. The table sits
//! in a `div`, inside the scroll container, inside `body` and `html`.

#![allow(dead_code)]

use async_trait::async_trait;
use eoka_harvest::dom::{AncestorLayout, ContainerRef, DomAccess, RawRow, ScrollMetrics};
use eoka_harvest::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Depth of the scroll container above the table's parent.
pub const CONTAINER_DEPTH: usize = 1;

pub fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// `n` ranking rows: rank, name, score.
pub fn ranking(n: usize) -> Vec<Vec<String>> {
    (1..=n)
        .map(|i| {
            vec![
                i.to_string(),
                format!("University {}", i),
                format!("{:.1}", 100.0 - i as f64 * 0.1),
            ]
        })
        .collect()
}

#[derive(Debug)]
struct State {
    table: bool,
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    /// Appended one batch at a time when the container hits bottom.
    pending: VecDeque<Vec<Vec<String>>>,
    scrollable: bool,
    row_height: u64,
    client_height: u64,
    overscan: usize,
    scroll_top: u64,
    indicator: Option<String>,
    fail_set_top: bool,
    fail_nudge: bool,
    metrics_budget: Option<usize>,
    set_calls: usize,
    nudge_calls: usize,
    metrics_calls: usize,
}

impl State {
    fn scroll_height(&self) -> u64 {
        self.rows.len() as u64 * self.row_height
    }

    fn max_top(&self) -> u64 {
        self.scroll_height().saturating_sub(self.client_height)
    }

    fn settle(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_top());
        if self.scroll_top == self.max_top() {
            if let Some(batch) = self.pending.pop_front() {
                self.rows.extend(batch);
            }
        }
    }

    fn window(&self) -> &[Vec<String>] {
        if !self.scrollable {
            return &self.rows;
        }
        let h = self.row_height.max(1);
        let first = (self.scroll_top / h) as usize;
        let last = (self.scroll_top + self.client_height).div_ceil(h) as usize;
        let first = first.saturating_sub(self.overscan);
        let last = (last + self.overscan).min(self.rows.len());
        &self.rows[first.min(last)..last]
    }

    fn check(&self, container: ContainerRef) -> Result<()> {
        if !self.scrollable || container.depth != CONTAINER_DEPTH {
            return Err(Error::Script(format!(
                "no container at depth {}",
                container.depth
            )));
        }
        Ok(())
    }
}

pub struct FakeDom {
    state: Mutex<State>,
}

impl FakeDom {
    /// A table inside a scroll container: 30px rows, 300px viewport,
    /// two rows of overscan.
    pub fn virtualized(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            state: Mutex::new(State {
                table: true,
                headers: Some(cells(headers)),
                rows,
                pending: VecDeque::new(),
                scrollable: true,
                row_height: 30,
                client_height: 300,
                overscan: 2,
                scroll_top: 0,
                indicator: None,
                fail_set_top: false,
                fail_nudge: false,
                metrics_budget: None,
                set_calls: 0,
                nudge_calls: 0,
                metrics_calls: 0,
            }),
        }
    }

    /// A table with no scrolling ancestor; every row is rendered.
    pub fn static_table(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        let dom = Self::virtualized(headers, rows);
        dom.with(|s| s.scrollable = false);
        dom
    }

    /// No table at all.
    pub fn empty() -> Self {
        let dom = Self::static_table(&[], vec![]);
        dom.with(|s| s.table = false);
        dom
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn without_header_row(self) -> Self {
        self.with(|s| s.headers = None);
        self
    }

    pub fn client_height(self, px: u64) -> Self {
        self.with(|s| s.client_height = px);
        self
    }

    pub fn lazy_batches(self, batches: Vec<Vec<Vec<String>>>) -> Self {
        self.with(|s| s.pending = batches.into());
        self
    }

    pub fn indicator(self, text: &str) -> Self {
        self.with(|s| s.indicator = Some(text.to_string()));
        self
    }

    pub fn failing_scroll_top(self) -> Self {
        self.with(|s| s.fail_set_top = true);
        self
    }

    pub fn failing_nudge(self) -> Self {
        self.with(|s| s.fail_nudge = true);
        self
    }

    /// Metrics reads beyond `n` fail.
    pub fn metrics_budget(self, n: usize) -> Self {
        self.with(|s| s.metrics_budget = Some(n));
        self
    }

    pub fn set_calls(&self) -> usize {
        self.with(|s| s.set_calls)
    }

    pub fn nudge_calls(&self) -> usize {
        self.with(|s| s.nudge_calls)
    }

    pub fn metrics_calls(&self) -> usize {
        self.with(|s| s.metrics_calls)
    }

    pub fn scroll_top(&self) -> u64 {
        self.with(|s| s.scroll_top)
    }

    pub fn rendered_count(&self) -> usize {
        self.with(|s| s.window().len())
    }
}

#[async_trait(?Send)]
impl DomAccess for FakeDom {
    async fn wait_for_table(&self, _timeout_ms: u64) -> Result<bool> {
        Ok(self.with(|s| s.table))
    }

    async fn header_cells(&self) -> Result<Option<Vec<String>>> {
        Ok(self.with(|s| if s.table { s.headers.clone() } else { None }))
    }

    async fn first_row_width(&self) -> Result<Option<usize>> {
        Ok(self.with(|s| s.rows.first().map(Vec::len)))
    }

    async fn table_ancestors(&self) -> Result<Vec<AncestorLayout>> {
        Ok(self.with(|s| {
            let content = s.scroll_height();
            let layer = |tag: &str, scroll_height, client_height, overflow_y: &str| AncestorLayout {
                tag: tag.to_string(),
                scroll_height,
                client_height,
                overflow_y: overflow_y.to_string(),
            };
            let container = if s.scrollable {
                layer("div", content, s.client_height, "auto")
            } else {
                layer("div", content, content, "visible")
            };
            vec![
                layer("div", content, content, "visible"),
                container,
                layer("body", 900, 900, "visible"),
                layer("html", 900, 900, "visible"),
            ]
        }))
    }

    async fn scroll_metrics(&self, container: ContainerRef) -> Result<ScrollMetrics> {
        self.with(|s| {
            s.check(container)?;
            s.metrics_calls += 1;
            if let Some(budget) = s.metrics_budget.as_mut() {
                if *budget == 0 {
                    return Err(Error::Script("container detached".into()));
                }
                *budget -= 1;
            }
            Ok(ScrollMetrics {
                scroll_top: s.scroll_top,
                scroll_height: s.scroll_height(),
                client_height: s.client_height,
            })
        })
    }

    async fn set_scroll_top(&self, container: ContainerRef, offset: u64) -> Result<()> {
        self.with(|s| {
            s.check(container)?;
            if s.fail_set_top {
                return Err(Error::Script("scrollTop is read-only here".into()));
            }
            s.set_calls += 1;
            s.scroll_top = offset;
            s.settle();
            Ok(())
        })
    }

    async fn scroll_by_page(&self, container: ContainerRef) -> Result<()> {
        self.with(|s| {
            s.check(container)?;
            if s.fail_nudge {
                return Err(Error::Script("scrollBy rejected".into()));
            }
            s.nudge_calls += 1;
            s.scroll_top += s.client_height;
            s.settle();
            Ok(())
        })
    }

    async fn rendered_rows(&self) -> Result<Vec<RawRow>> {
        Ok(self.with(|s| {
            s.window()
                .iter()
                .map(|r| RawRow::from_texts(r.iter().cloned()))
                .collect()
        }))
    }

    async fn results_indicator(&self) -> Result<Option<String>> {
        Ok(self.with(|s| s.indicator.clone()))
    }
}
