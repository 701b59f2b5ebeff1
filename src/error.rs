//! Errors of the texture, lighting and draw layers.
//!
//! All of them are local and recoverable: a failed load leaves the registry as
//! it was, a rejected light setup writes no uniforms, and a failed lookup leaves
//! the rest of the draw state intact.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture registry is full ({capacity} slots), cannot load {tag:?}")]
    CapacityExceeded { tag: String, capacity: usize },

    #[error("a texture tagged {tag:?} is already loaded in slot {slot}")]
    DuplicateTag { tag: String, slot: usize },

    #[error("could not read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path} has {channels} channels, only RGB and RGBA are supported")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error("image {tag:?} is {width}x{height}, larger than the device limit of {max}")]
    TooLarge {
        tag: String,
        width: u32,
        height: u32,
        max: u32,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LightingError {
    #[error("{requested} lights configured but the shader holds at most {capacity}")]
    TooManyLights { requested: usize, capacity: usize },

    #[error("light index {index} is outside the shader light array (0..{capacity})")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("light index {index} is configured more than once")]
    DuplicateIndex { index: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("no texture tagged {0:?} is loaded")]
    UnknownTexture(String),

    #[error("no material tagged {0:?} is defined")]
    UnknownMaterial(String),

    #[error("textures must be bound before they are used for drawing")]
    TexturesNotBound,
}
