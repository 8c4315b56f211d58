pub mod formatter;

pub use formatter::{
    format_cost, format_fp, format_scored_table, format_scored_tsv, format_summary_table,
    format_summary_tsv, should_use_colors,
};
