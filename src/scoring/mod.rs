pub mod scorer;
pub mod ranking;
