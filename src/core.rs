pub mod features;
pub mod lifecycle;
pub mod remote;
pub mod session;
pub mod store;
