pub mod args_parser;
pub use args_parser::*;

pub mod clause_layout;
pub use clause_layout::*;

pub mod function_call;
pub use function_call::*;

pub mod group_by;
pub use group_by::*;

pub mod limit_offset_parser;
pub use limit_offset_parser::*;

pub mod projection_parser;
pub use projection_parser::*;

pub mod text_collector;
pub use text_collector::*;
