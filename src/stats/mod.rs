//! Statistics retrieval and table assembly.
//!
//! - [`fetch`]: profile page download and HTML-to-text reduction
//! - [`section`]: stat-block decoding (value/label pairs between two markers)
//! - [`table`]: assembly of per-user records into a rectangular table
//! - [`error`]: the error taxonomy shared by the above

pub mod error;
pub mod fetch;
pub mod section;
pub mod table;

pub use error::StatsError;
pub use fetch::StatsClient;
pub use section::StatRecord;
pub use table::{aggregate, StatsTable, ABSENT};
