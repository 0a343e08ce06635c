pub mod item;
pub mod location;
pub mod order;
pub mod session;
pub mod stock;
pub mod transfer;
