extern crate pest;
#[macro_use]
extern crate pest_derive;
pub mod delim;
pub mod field_specs;
pub mod fixed;
pub mod printf;
pub mod round;
pub mod tokenize;
