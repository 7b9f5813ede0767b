//! wintun-ctl: Wintun adapter control
//!
//! A library for driving the Wintun virtual network adapter driver:
//! binding its library at runtime, managing adapter handles, deriving
//! stable adapter GUIDs, and forwarding driver diagnostics to `tracing`.

pub mod adapter;
pub mod config;
pub mod driver;
pub mod guid;
pub mod logger;
