mod attribute;
mod customer;
mod product;

pub use attribute::*;
pub use customer::*;
pub use product::*;
