//! HTTP Handlers

mod character;
mod image;
mod ping;
mod pronoun;

pub use character::*;
pub use image::*;
pub use ping::*;
pub use pronoun::*;
