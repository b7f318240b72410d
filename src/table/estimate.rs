use crate::dom::DomAccess;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d[\d,]*").expect("valid regex"))
}

/// Largest number in an indicator like "Showing 1-20 of 1,482 results".
pub fn total_from_text(text: &str) -> Option<u64> {
    number_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .max()
}

/// The page's own row count, if it advertises one. Never an error: a missing
/// or unreadable indicator just means the collector has no target.
pub async fn expected_total<D: DomAccess + ?Sized>(dom: &D) -> Option<u64> {
    let text = match dom.results_indicator().await {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("no results indicator on page");
            return None;
        }
        Err(e) => {
            debug!("results indicator unreadable: {}", e);
            return None;
        }
    };
    let total = total_from_text(&text);
    debug!("results indicator {:?} -> {:?}", text, total);
    total
}
