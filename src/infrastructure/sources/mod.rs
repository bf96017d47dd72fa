// Draw history sources
pub mod csv_draw_source;
pub mod synthetic;

pub use csv_draw_source::{CsvDrawSource, parse_draws, write_draws};
pub use synthetic::{SyntheticDrawSource, generate_draws};
