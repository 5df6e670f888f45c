//! Data types shared by the grid engine.

mod cell;
mod column;
mod position;
mod row;
mod selection;
mod sort;

pub use cell::*;
pub use column::*;
pub use position::*;
pub use row::*;
pub use selection::*;
pub use sort::*;

pub(crate) use position::to_i32;
