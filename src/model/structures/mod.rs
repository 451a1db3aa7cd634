pub mod rating_metric;
pub mod segment_type;
