#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::return_self_not_must_use,
    clippy::field_reassign_with_default
)]
mod error;
pub use error::*;

mod image_buffer;
pub use image_buffer::*;

mod palette;
pub use palette::*;

mod sprite;
pub use sprite::*;

pub mod formats;
pub use formats::*;

pub mod fileop;
pub use fileop::*;
