use crate::dom::{AncestorLayout, ContainerRef, DomAccess};
use crate::Result;
use tracing::{debug, warn};

/// An ancestor scrolls the table if its content is taller than its box and
/// its `overflow-y` lets it scroll.
fn is_scroll_container(layout: &AncestorLayout) -> bool {
    let overflow = layout.overflow_y.to_ascii_lowercase();
    layout.scroll_height > layout.client_height
        && (overflow.contains("auto") || overflow.contains("scroll"))
}

/// First qualifying entry of `ancestors`, which runs from the table's parent
/// towards the root.
pub fn nearest_scrollable(ancestors: &[AncestorLayout]) -> Option<ContainerRef> {
    ancestors
        .iter()
        .position(is_scroll_container)
        .map(|depth| ContainerRef { depth })
}

/// Find the element that virtualizes the table. `None` means the table is not
/// inside a scroll container (or the walk could not be run) and should be read
/// as it is.
pub async fn locate_container<D: DomAccess + ?Sized>(dom: &D) -> Result<Option<ContainerRef>> {
    let ancestors = match dom.table_ancestors().await {
        Ok(a) => a,
        Err(e) => {
            warn!("Could not walk the table's ancestors: {}", e);
            return Ok(None);
        }
    };
    let found = nearest_scrollable(&ancestors);
    match found {
        Some(c) => debug!(
            "scroll container: <{}> at depth {} ({} / {})",
            ancestors[c.depth].tag,
            c.depth,
            ancestors[c.depth].scroll_height,
            ancestors[c.depth].client_height
        ),
        None => debug!(
            "no scroll container among {} ancestors",
            ancestors.len()
        ),
    }
    Ok(found)
}
