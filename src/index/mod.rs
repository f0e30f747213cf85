pub mod fields;
pub mod posting;
pub mod inverted;
pub mod filterable;
