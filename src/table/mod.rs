//! Reading the table: column names, rendered rows, the scroll container and
//! the page's own idea of how many rows there are.

pub mod estimate;
pub mod header;
pub mod locate;
pub mod row;

pub use estimate::{expected_total, total_from_text};
pub use header::{positional_name, HeaderSet};
pub use locate::{locate_container, nearest_scrollable};
pub use row::{sample_row, IdentityMode, Row, RowIdentity, RowShape};
