pub mod common;
pub mod gateway;
pub mod image;
pub mod text;

pub use common::*;
pub use gateway::*;
pub use image::*;
pub use text::*;
