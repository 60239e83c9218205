//! ChatPro terminal client library exports

pub mod core;
pub mod net;
pub mod tui;

#[cfg(test)]
pub mod test_support;
