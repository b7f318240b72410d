//! The scroll loop.
//!
//! [`Collector::run`] reads the headers, finds the container that virtualizes
//! the table and then walks its scroll range in steps, sampling whatever rows
//! are mounted after each move. Rows are deduplicated by [`RowIdentity`] and
//! kept in order of first sighting. When the bottom is reached the sweep
//! starts again from the top, as long as the previous sweep found something
//! new. Tables outside any scroll container are read once, as they are.
//!
//! [`RowIdentity`]: crate::table::RowIdentity

mod pacing;
mod rows;

pub use pacing::Pacing;
pub use rows::RowSet;

use crate::config::CollectConfig;
use crate::dom::{ContainerRef, DomAccess, ScrollMetrics};
use crate::table::{locate_container, sample_row, HeaderSet, Row};
use crate::Result;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why collection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No scroll container; the rendered rows were read once.
    Static,
    /// As many rows as the page advertised.
    ExpectedReached,
    /// A full sweep of the container turned up nothing new.
    NoProgress,
    /// `max_iterations` scroll steps taken.
    IterationCeiling,
    /// `max_passes` sweeps taken and the table was still yielding rows.
    PassLimit,
    /// Neither setting nor nudging the scroll position worked.
    ScrollFailed,
    /// The container disappeared or stopped reporting its size.
    ContainerLost,
    /// `timeout_ms` elapsed.
    Deadline,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Static => "static table, read once",
            StopReason::ExpectedReached => "expected row count reached",
            StopReason::NoProgress => "no new rows in a full pass",
            StopReason::IterationCeiling => "iteration ceiling reached",
            StopReason::PassLimit => "pass limit reached",
            StopReason::ScrollFailed => "scrolling failed",
            StopReason::ContainerLost => "scroll container lost",
            StopReason::Deadline => "deadline elapsed",
        };
        f.write_str(s)
    }
}

/// Output of a run.
#[derive(Debug, Clone)]
pub struct Collection {
    pub headers: HeaderSet,
    /// Rows in order of first sighting.
    pub rows: Vec<Row>,
    /// Row count the page advertised, if any.
    pub expected_total: Option<u64>,
    pub stop: StopReason,
    /// Scroll steps taken.
    pub iterations: usize,
    /// Sweeps of the container started.
    pub passes: usize,
}

impl Collection {
    /// Whether the advertised row count (if any) was collected.
    pub fn reached_expected(&self) -> bool {
        self.expected_total
            .is_some_and(|total| self.rows.len() as u64 >= total)
    }
}

/// Scroll position bookkeeping for one run.
#[derive(Debug, Clone, Copy)]
struct ScrollState {
    /// Where the next move goes.
    offset: u64,
    step: u64,
    /// Where the container actually is, as last measured.
    scroll_top: u64,
    scroll_height: u64,
    client_height: u64,
}

impl ScrollState {
    fn new(metrics: ScrollMetrics, config: &CollectConfig) -> Self {
        let scaled = (metrics.client_height as f64 * config.step_ratio).floor() as u64;
        Self {
            offset: 0,
            step: scaled.max(config.min_step_px).max(1),
            scroll_top: metrics.scroll_top,
            scroll_height: metrics.scroll_height,
            client_height: metrics.client_height,
        }
    }

    fn observe(&mut self, metrics: ScrollMetrics) {
        self.scroll_top = metrics.scroll_top;
        self.scroll_height = metrics.scroll_height;
        self.client_height = metrics.client_height;
    }

    fn past_bottom(&self) -> bool {
        self.offset > self.scroll_height
    }
}

/// Drives one collection run over a [`DomAccess`].
pub struct Collector<'a, D: DomAccess + ?Sized> {
    dom: &'a D,
    config: CollectConfig,
    pacing: Pacing,
}

impl<'a, D: DomAccess + ?Sized> Collector<'a, D> {
    /// Collector with pauses taken from the config's wait range.
    pub fn new(dom: &'a D, config: &CollectConfig) -> Self {
        let (min, max) = config.wait_range();
        Self {
            dom,
            config: config.clone(),
            pacing: Pacing::new(min, max),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Collect every row of the table. `expected_total` is a stopping hint
    /// only; zero counts as no hint.
    pub async fn run(&self, expected_total: Option<u64>) -> Result<Collection> {
        let expected_total = expected_total.filter(|&t| t > 0);
        let headers = HeaderSet::extract(self.dom, self.config.table_timeout_ms).await?;

        let Some(container) = locate_container(self.dom).await? else {
            info!("No scroll container found, reading the table as rendered");
            return self.read_static(headers, expected_total).await;
        };

        let collection = self.scroll(headers, container, expected_total).await?;
        match (collection.stop, collection.expected_total) {
            (StopReason::ExpectedReached, _) | (_, None) => {
                info!(
                    "Collected {} rows in {} iterations: {}",
                    collection.rows.len(),
                    collection.iterations,
                    collection.stop
                );
            }
            (stop, Some(total)) => {
                warn!(
                    "Collected {} of {} advertised rows: {}",
                    collection.rows.len(),
                    total,
                    stop
                );
            }
        }
        Ok(collection)
    }

    /// One pass over the rows present right now, no scrolling and no dedup.
    async fn read_static(
        &self,
        headers: HeaderSet,
        expected_total: Option<u64>,
    ) -> Result<Collection> {
        let rows: Vec<Row> = self
            .dom
            .rendered_rows()
            .await?
            .iter()
            .filter_map(sample_row)
            .map(|cells| Row::from_cells(cells, &headers))
            .collect();
        debug!("static read: {} rows", rows.len());
        Ok(Collection {
            headers,
            rows,
            expected_total,
            stop: StopReason::Static,
            iterations: 0,
            passes: 0,
        })
    }

    async fn scroll(
        &self,
        headers: HeaderSet,
        container: ContainerRef,
        expected_total: Option<u64>,
    ) -> Result<Collection> {
        let metrics = match self.dom.scroll_metrics(container).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Could not measure scroll container ({}), reading as rendered", e);
                return self.read_static(headers, expected_total).await;
            }
        };
        if metrics.scroll_height == 0 || metrics.client_height == 0 {
            debug!("scroll container has no height: {:?}", metrics);
            return self.read_static(headers, expected_total).await;
        }

        let mut state = ScrollState::new(metrics, &self.config);
        debug!(
            "scrolling: step={}px, height={}px, client={}px",
            state.step, state.scroll_height, state.client_height
        );
        if let Err(e) = self.dom.set_scroll_top(container, 0).await {
            debug!("reset to top failed: {}", e);
        }

        let deadline = self
            .config
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let mut rows = RowSet::new(self.config.identity);
        let mut iterations = 0;
        let mut passes = 1;
        let mut collected_at_pass_start = 0;

        let stop = loop {
            match self.dom.scroll_metrics(container).await {
                Ok(m) => state.observe(m),
                Err(e) => {
                    warn!("Scroll container stopped responding: {}", e);
                    break StopReason::ContainerLost;
                }
            }

            if state.past_bottom() {
                if rows.len() == collected_at_pass_start {
                    break StopReason::NoProgress;
                }
                if passes >= self.config.max_passes {
                    break StopReason::PassLimit;
                }
                info!(
                    "Reached bottom with {} new rows, sweeping again from the top",
                    rows.len() - collected_at_pass_start
                );
                collected_at_pass_start = rows.len();
                state.offset = 0;
                passes += 1;
            }

            if !self.move_to(container, state.offset).await {
                break StopReason::ScrollFailed;
            }
            self.pacing.pause().await;

            let rendered = self.dom.rendered_rows().await?;
            match self.dom.scroll_metrics(container).await {
                Ok(m) => {
                    state.observe(m);
                    debug!(
                        "scrollTop={} / {} (client={}) visible rows={} collected={}",
                        state.scroll_top,
                        state.scroll_height,
                        state.client_height,
                        rendered.len(),
                        rows.len()
                    );
                }
                Err(e) => debug!("could not re-measure after moving to {}: {}", state.offset, e),
            }
            let added = rows.merge(rendered.iter().filter_map(sample_row), &headers);

            state.offset += state.step;
            iterations += 1;

            if added > 0 {
                self.pacing.pause().await;
            }

            if expected_total.is_some_and(|total| rows.len() as u64 >= total) {
                break StopReason::ExpectedReached;
            }
            if iterations >= self.config.max_iterations {
                break StopReason::IterationCeiling;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::Deadline;
            }
        };

        Ok(Collection {
            headers,
            rows: rows.into_rows(),
            expected_total,
            stop,
            iterations,
            passes,
        })
    }

    /// Put the container at `offset`, nudging by a page if that fails.
    /// `false` when neither works.
    async fn move_to(&self, container: ContainerRef, offset: u64) -> bool {
        let Err(e) = self.dom.set_scroll_top(container, offset).await else {
            return true;
        };
        warn!("Setting scrollTop={} failed ({}), nudging by one page", offset, e);
        match self.dom.scroll_by_page(container).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Relative scroll failed too: {}", e);
                false
            }
        }
    }
}
