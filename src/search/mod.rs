pub mod prefix;
pub mod fuzzy;
pub mod results;
pub mod facets;
pub mod formatter;
pub mod executor;
