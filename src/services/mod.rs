pub mod analysis;
pub mod chat;
pub mod reporting;

#[cfg(test)]
mod reporting_tests;
