//! Terminal presentation for the `atlas` binary

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, failure, file_removed, file_status, header, section, status, success, summary_row, warn,
};
pub use table::{groups_table, matches_table, pack_table, stats_table};
pub use theme::{theme, Theme};
