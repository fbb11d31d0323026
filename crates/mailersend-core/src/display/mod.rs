pub mod table;

pub use table::{TableDisplay, colors_enabled};
