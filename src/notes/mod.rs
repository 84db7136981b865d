//! Append-only note storage.
//!
//! [`types`] defines the [`Note`](types::Note) record; [`store`] persists notes
//! into the FTS5 `memory` table. Notes are never updated or deleted.

pub mod store;
pub mod types;

pub use store::NoteStore;
pub use types::Note;
