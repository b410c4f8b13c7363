pub mod classification;
pub mod event;
pub mod feed;
pub mod match_record;
pub mod team;
