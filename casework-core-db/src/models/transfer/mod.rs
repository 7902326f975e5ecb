pub mod transfer_record;

pub use transfer_record::*;
