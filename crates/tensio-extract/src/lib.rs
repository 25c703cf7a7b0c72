//! AI-assisted extraction of readings from monitor photographs.
//!
//! An image enters as raw bytes, gets content-hashed and media-sniffed
//! ([`payload::ImagePayload`]), is submitted to the external extraction
//! service through [`client::ImageExtractionClient`] (which reuses cached
//! submissions by content hash), and the proposed values then sit in an
//! [`draft::ExtractionDraft`] until a human confirms or rejects them.
//! Only a confirmed draft ever becomes a [`tensio_core::reading::Reading`].

pub mod cache;
pub mod client;
pub mod draft;
pub mod error;
pub mod payload;

pub use client::{
  ExtractionBackend, ExtractionResult, HttpExtractionBackend,
  ImageExtractionClient,
};
pub use draft::{ConfirmInput, DraftState, ExtractionDraft};
pub use error::{Error, Result};
pub use payload::{ImagePayload, MediaType};
