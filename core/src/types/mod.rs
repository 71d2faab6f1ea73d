//! Core type definitions for segmentation label metadata
//!
//! This module provides the data model shared by both pipelines:
//! - [`MetadataDocument`]: Root sidecar document exchanged before and after inference
//! - [`SliceReference`]: Index/path pair of the depth-sorted source slices
//! - [`TemporalValue`]: Tag value wrapped in the viewer's time/space envelope
//! - [`LabelEntry`]: Per-label identity, color, and visibility attributes

mod document;
mod label;
mod reference;
mod temporal;

pub use document::{
    strip_volume_suffix, Group, MetadataDocument, Properties, StringLookupTable, DOCUMENT_SUFFIX,
    DOCUMENT_TYPE, DOCUMENT_VERSION, VOLUME_SUFFIX,
};
pub use label::{LabelEntry, LABEL_OPACITY};
pub use reference::SliceReference;
pub use temporal::{TemporalValue, TemporoSpatialProperty, TypedProperty};
