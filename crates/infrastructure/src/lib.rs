//! dnswire infrastructure: the wire codec and the UDP transport built on it.
pub mod dns;
