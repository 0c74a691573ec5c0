pub mod extractor;
pub mod filter;
pub mod forms;
pub mod jwt;
pub mod test_utils;
