pub mod connection;
pub use connection::Connection;

pub mod results;
pub use results::QueryError;

pub mod schema;

mod members;
mod shares;
mod dues;
mod invoices;
mod assemblies;
