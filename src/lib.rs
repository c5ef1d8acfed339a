//! Scene Engine — a branching-narrative player for visual-novel style games.
//!
//! Story content is a set of chapter and ending files, each a table of
//! scenes. The engine reveals each scene's text over time, offers choices,
//! keeps a score ledger that gates conditional branches, and moves between
//! files as the story demands. Drawing, input polling and frame pacing are
//! left to the host through the `ContentStore` and `Presenter` seams.

pub mod core;
pub mod schema;

pub use crate::core::config::EngineConfig;
pub use crate::core::content::{ContentStore, DirContentStore, MemoryContentStore};
pub use crate::core::machine::{Phase, ProgressionStateMachine, Report, StartupError};
pub use crate::core::presenter::{Presenter, RenderSnapshot};
