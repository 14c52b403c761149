//! # billtrack-sheets
//!
//! Tabular store contract and implementations.
//!
//! The sync core consumes [`SheetStore`]; production uses [`GoogleSheets`],
//! tests use [`MemSheet`].

pub mod error;
pub mod gsheets;
pub mod mem;
pub mod store;

pub use error::SheetError;
pub use gsheets::GoogleSheets;
pub use mem::MemSheet;
pub use store::{col_letters, CellStyle, CellUpdate, SheetStore};
