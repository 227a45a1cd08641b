pub mod import;
pub mod resolver;

pub use import::{finalize, parse_sheet, ColumnMapping, ImportSheet};
pub use resolver::{AudienceResolver, ResolvedRecipient};
