pub mod colorimetry;
pub mod logger;
