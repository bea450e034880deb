//! Utilities shared by apicheck tests.
//!
//! [`ClassFileBuilder`] assembles small but valid `.class` files so that classpath and CLI
//! tests can run without a JDK. The [`javac`](crate::javac) module drives a real `javac`
//! for opt-in differential tests:
//!
//! ```bash
//! # Run ignored tests (requires `javac` on PATH)
//! cargo test -p apicheck-cli --test javac_differential -- --ignored
//! ```

mod classfile_builder;

pub use classfile_builder::{ClassFileBuilder, MemberBuilder};

#[cfg(feature = "javac")]
pub mod javac;
