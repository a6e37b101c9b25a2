//! # Tarkib Support
//!
//! Text helpers shared by the Tarkib crates, mostly used to make
//! resolution errors readable:
//! - shortening fully qualified type names
//! - rendering resolution chains
//! - "did you mean?" suggestions

pub mod rendering;
