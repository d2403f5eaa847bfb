pub mod entry_row;
pub mod styling;

pub use entry_row::entry_row;
pub use styling::apply_diary_style;
