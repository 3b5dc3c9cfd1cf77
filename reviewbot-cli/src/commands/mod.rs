//! CLI command implementations

mod classify;
mod run;

pub use classify::ClassifyArgs;
pub use run::RunArgs;
