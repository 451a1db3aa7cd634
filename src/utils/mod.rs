pub mod rounding;
pub mod test_utils;
