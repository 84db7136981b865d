pub mod ask;
pub mod doctor;
pub mod export;
pub mod query;

pub use ask::{remember, remind};
pub use doctor::doctor;
pub use export::export;
pub use query::query;
