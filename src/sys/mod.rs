pub mod ax;
pub mod geometry;
pub mod screen;
pub mod scripted;
pub mod window_server;
