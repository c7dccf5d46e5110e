//! HTTP handlers for the Palletrack API

pub mod articles;
pub mod bins;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod search;

pub use articles::*;
pub use bins::*;
pub use dashboard::*;
pub use export::*;
pub use health::*;
pub use search::*;
