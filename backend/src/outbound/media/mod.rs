//! Image host outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ImageUploader`
//! port against a Cloudinary-compatible upload API.

mod cloudinary_uploader;
mod dto;

pub use cloudinary_uploader::{CloudinaryBuildError, CloudinaryConfig, CloudinaryUploader};
