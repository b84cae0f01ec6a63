//! Codepaint core
//!
//! Inlines variable bindings in a small C-family scripting language and
//! highlights which `if` branches a set of parameter values takes.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod painter;
pub mod parser;
pub mod printer;
pub mod substitute;
pub mod types;

// Re-export main types
pub use analysis::{AnalysisError, Analyzer, Painting, Report};
pub use config::Config;
pub use painter::{Classification, EvaluationError, RenderOptions};
pub use parser::{parse_program, ParseError};
pub use printer::{print_program, Printer};
pub use substitute::substitute;
