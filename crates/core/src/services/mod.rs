pub mod live_panel;
pub mod market_service;
pub mod projection_service;
pub mod rolling_window;
pub mod series_generator;
