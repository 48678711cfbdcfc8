pub mod applications;
pub mod assemblies;
pub mod errors;
pub mod shares;

pub use errors::{AssemblyError, MembershipError};
