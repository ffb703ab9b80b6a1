// Backend module - Vulkan abstraction layer
//
// Thin wrappers around ash: explicit control, paired destroys owned by
// wrapper types, transient vs fatal errors kept apart at the seams.

pub mod buffer;
pub mod device;
pub mod image;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;

pub use device::{DeviceContext, Instance, Surface};
pub use swapchain::{ImageAcquire, Swapchain};
