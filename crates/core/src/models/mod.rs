pub mod instrument;
pub mod projection;
pub mod quote;
pub mod sample;
pub mod series;
pub mod settings;
