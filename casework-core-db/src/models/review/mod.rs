pub mod review_record;

pub use review_record::*;
