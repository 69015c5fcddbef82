pub mod query_parser;
pub use query_parser::*;

pub mod ast;

pub mod parse_error;
pub use parse_error::*;

pub mod phase;
pub use phase::*;

pub mod placeholder_locator;
pub use placeholder_locator::*;

pub mod word_comparer;
pub use word_comparer::*;

pub mod query_comparers;
pub use query_comparers::*;
