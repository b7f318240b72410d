use super::{AncestorLayout, ContainerRef, DomAccess, RawRow, ScrollMetrics};
use crate::{Error, Result};
use async_trait::async_trait;
use eoka::Page;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Walk from the table's parent up to the root, reporting each element's
/// scroll geometry.
const ANCESTORS_JS: &str = r#"(() => {
    const table = document.querySelector('table');
    const out = [];
    let el = table ? table.parentElement : null;
    while (el) {
        const style = window.getComputedStyle(el);
        out.push({
            tag: el.tagName.toLowerCase(),
            scroll_height: Math.round(el.scrollHeight),
            client_height: Math.round(el.clientHeight),
            overflow_y: style.overflowY || '',
        });
        el = el.parentElement;
    }
    return JSON.stringify(out);
})()"#;

/// Resolve the container `__DEPTH__` steps above the table's parent, then run
/// `__BODY__` with it bound to `el`.
const CONTAINER_JS: &str = r#"(() => {
    const table = document.querySelector('table');
    let el = table ? table.parentElement : null;
    for (let i = 0; i < __DEPTH__ && el; i++) el = el.parentElement;
    if (!el) return JSON.stringify(null);
    __BODY__
})()"#;

const METRICS_BODY: &str = r#"return JSON.stringify({
        scroll_top: Math.round(el.scrollTop),
        scroll_height: Math.round(el.scrollHeight),
        client_height: Math.round(el.clientHeight),
    });"#;

const SET_TOP_BODY: &str = "el.scrollTop = __OFFSET__; return JSON.stringify(true);";

const PAGE_DOWN_BODY: &str =
    "el.scrollTop = el.scrollTop + el.clientHeight; return JSON.stringify(true);";

const HEADER_JS: &str = r#"(() => {
    const table = document.querySelector('table');
    const head = table ? table.querySelector('thead') : null;
    if (!head) return JSON.stringify(null);
    const cells = Array.from(head.querySelectorAll('th'))
        .map(th => th.innerText || th.textContent || '');
    return JSON.stringify(cells);
})()"#;

const FIRST_ROW_JS: &str = r#"(() => {
    const table = document.querySelector('table');
    const tr = table ? table.querySelector('tr') : null;
    if (!tr) return JSON.stringify(null);
    return JSON.stringify(tr.querySelectorAll('td').length);
})()"#;

/// Rows under `tbody`, or every `tr` of the table when it has no body.
/// Each cell is read twice; a read that throws is reported as null.
const ROWS_JS: &str = r#"(() => {
    const table = document.querySelector('table');
    if (!table) return JSON.stringify([]);
    const body = table.querySelector('tbody');
    const rows = body ? body.querySelectorAll('tr') : table.querySelectorAll('tr');
    const out = [];
    for (const tr of rows) {
        const cells = [];
        for (const td of tr.querySelectorAll('td')) {
            let inner = null;
            let text = null;
            try { inner = td.innerText; } catch (e) {}
            try { text = td.textContent; } catch (e) {}
            cells.push({ inner_text: inner ?? null, text: text ?? null });
        }
        out.push({ cells });
    }
    return JSON.stringify(out);
})()"#;

/// Innermost visible element mentioning both "showing" and "result".
const INDICATOR_JS: &str = r#"(() => {
    if (!document.body) return JSON.stringify(null);
    const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
    const read = (el) => (el.innerText || el.textContent || '');
    const matches = (el) => {
        if (skip.has(el.tagName)) return false;
        const t = read(el).toLowerCase();
        return t.includes('showing') && t.includes('result');
    };
    for (const el of document.body.querySelectorAll('*')) {
        if (!matches(el)) continue;
        if (Array.from(el.children).some(matches)) continue;
        return JSON.stringify(read(el).trim());
    }
    return JSON.stringify(null);
})()"#;

/// [`DomAccess`] over a live eoka page.
pub struct PageDom<'a> {
    page: &'a Page,
}

impl<'a> PageDom<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Evaluate a script that returns `JSON.stringify(...)` and decode it.
    async fn eval_json<T: DeserializeOwned>(&self, js: &str) -> Result<T> {
        let json: String = self.page.evaluate(js).await?;
        serde_json::from_str(&json).map_err(|e| Error::Script(format!("{}: {}", e, json)))
    }

    async fn on_container<T: DeserializeOwned>(
        &self,
        container: ContainerRef,
        body: &str,
    ) -> Result<T> {
        let js = CONTAINER_JS
            .replace("__DEPTH__", &container.depth.to_string())
            .replace("__BODY__", body);
        let value: Option<T> = self.eval_json(&js).await?;
        value.ok_or_else(|| {
            Error::Script(format!(
                "scroll container at depth {} is no longer attached",
                container.depth
            ))
        })
    }

    async fn has_table(&self) -> Result<bool> {
        Ok(self.page.evaluate("!!document.querySelector('table')").await?)
    }
}

#[async_trait(?Send)]
impl DomAccess for PageDom<'_> {
    async fn wait_for_table(&self, timeout_ms: u64) -> Result<bool> {
        if let Err(e) = self.page.wait_for("table", timeout_ms).await {
            debug!("wait_for table: {}", e);
        }
        self.has_table().await
    }

    async fn header_cells(&self) -> Result<Option<Vec<String>>> {
        self.eval_json(HEADER_JS).await
    }

    async fn first_row_width(&self) -> Result<Option<usize>> {
        self.eval_json(FIRST_ROW_JS).await
    }

    async fn table_ancestors(&self) -> Result<Vec<AncestorLayout>> {
        self.eval_json(ANCESTORS_JS).await
    }

    async fn scroll_metrics(&self, container: ContainerRef) -> Result<ScrollMetrics> {
        self.on_container(container, METRICS_BODY).await
    }

    async fn set_scroll_top(&self, container: ContainerRef, offset: u64) -> Result<()> {
        let body = SET_TOP_BODY.replace("__OFFSET__", &offset.to_string());
        let _: bool = self.on_container(container, &body).await?;
        Ok(())
    }

    async fn scroll_by_page(&self, container: ContainerRef) -> Result<()> {
        let _: bool = self.on_container(container, PAGE_DOWN_BODY).await?;
        Ok(())
    }

    async fn rendered_rows(&self) -> Result<Vec<RawRow>> {
        self.eval_json(ROWS_JS).await
    }

    async fn results_indicator(&self) -> Result<Option<String>> {
        self.eval_json(INDICATOR_JS).await
    }
}
