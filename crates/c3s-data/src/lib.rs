// Operations
mod operations;
pub use operations::*;

mod columns;

mod tokens;
pub use tokens::make_token;

// Models
mod members;
pub use members::*;

mod shares;
pub use shares::*;

mod dues;
pub use dues::*;

mod invoices;
pub use invoices::*;

mod assemblies;
pub use assemblies::*;
