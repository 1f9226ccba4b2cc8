pub mod builder;
pub mod extractor;
pub mod hvac;
pub mod lp;
pub mod solvers;
pub mod types;
pub mod weights;

pub use builder::*;
pub use extractor::*;
pub use hvac::*;
pub use lp::*;
pub use solvers::*;
pub use types::*;
pub use weights::*;
