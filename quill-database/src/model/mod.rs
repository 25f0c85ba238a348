/// Tag, alias, transfer, and use entity records.
pub mod tags;

pub use tags::{Alias, Tag, Transfer, Use};
