mod assembly;
mod dues;
mod invoices;
mod members;

pub use assembly::*;
pub use dues::*;
pub use invoices::*;
pub use members::*;
