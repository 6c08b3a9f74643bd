pub mod column_ref;
pub use column_ref::*;

pub mod predicate;
pub use predicate::*;

pub mod join;
pub use join::*;

pub mod order;
pub use order::*;

pub mod criteria;
pub use criteria::*;
