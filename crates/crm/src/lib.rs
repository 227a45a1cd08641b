pub mod connections;
pub mod leads;
pub mod seed;
pub mod templates;

pub use connections::ConnectionDirectory;
pub use leads::{LeadStore, MemoryLeadStore};
pub use templates::TemplateCatalog;
