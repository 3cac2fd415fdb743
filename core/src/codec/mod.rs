pub mod table;

pub use table::{parse_table, write_table, TABLE_COLUMNS};
