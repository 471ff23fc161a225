//! `ext2ops`: an on-disk metadata engine for a single-block-group, ext2-style filesystem image
//! held in a regular file. Six commands (`mkdir`, `cp-in`, `ln`, `ln -s`, `rm`, `restore`,
//! `fsck`) are built as compositions of four layers: [`image`], [`layout`], [`alloc`], and
//! [`dirstream`], resolved against an image via [`path`].

pub mod alloc;
pub mod commands;
pub mod dirstream;
pub mod error;
pub mod image;
pub mod layout;
pub mod path;
pub mod util;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::Error;
pub use error::Result;
pub use image::Image;
