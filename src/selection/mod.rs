//! Cell selection, navigation and editing state.
//!
//! Keyboard and pointer input is translated into [`Intent`]s which the
//! [`SelectionMachine`] turns into a new state plus a list of [`Effect`]s.
//! Row selection is caller-owned; [`rows`] computes the next set.

mod intent;
mod machine;
pub mod rows;

pub use intent::{key_intent, Intent, KeyInput, NavDirection};
pub use machine::{Effect, NavContext, RowKeyFn, SelectionMachine};
