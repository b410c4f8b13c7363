pub mod aggregate;
pub mod classification;
pub mod config;
pub mod error;
pub mod handler;
pub mod ical;
pub mod identity;
pub mod model;
pub mod output;
pub mod synthesizer;
pub mod text;
pub mod upstream;
