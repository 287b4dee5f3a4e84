//! Clustered deferred shading on the CPU.
//!
//! The geometry pass leaves normals, albedo and positions in three G-buffer
//! targets. An upstream light-assignment stage packs the scene lights and the
//! per-cluster light lists into two RGBA float texel buffers. This crate
//! decodes those buffers and shades every pixel against the lights of the
//! view-space cluster it falls in.

pub mod cluster;
pub mod gbuffer;
mod global_uniform;
pub mod light;
pub mod render;
pub mod shading;
pub mod texture;

pub use cluster::{ClusterBuffer, ClusterGrid, ClusterLights};
pub use gbuffer::{GBufferSample, GBuffers};
pub use global_uniform::ShadingUniforms;
pub use light::{LightBuffer, PointLight};
pub use render::{DeferredPass, Frame};
pub use texture::{TexelBuffer, TextureError};
