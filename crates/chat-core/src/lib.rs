pub mod ports;
pub mod transport;
pub mod decoder;
pub mod events;
pub mod session;
pub mod directory;
pub mod switcher;
