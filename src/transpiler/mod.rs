pub mod pipeline;
pub use pipeline::*;
pub mod pagination;
pub use pagination::*;
pub mod functions;
pub use functions::*;
pub mod grouping;
pub use grouping::*;
pub mod subquery_alias;
pub use subquery_alias::*;
pub mod renumber;
pub use renumber::*;

#[cfg(test)]
mod _tests;
