// Frame-in-flight synchronization
//
// One slot per frame that may be in flight: two binary semaphores chain
// acquire -> draw -> present on the GPU, the fence tells the CPU when the
// slot's command buffer finished. Slots outlive swapchain rebuilds.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::DeviceContext;

/// Synchronization primitives for one frame-in-flight slot.
pub struct FrameSlot {
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight: vk::Fence,
}

impl FrameSlot {
    pub fn new(device: &Arc<DeviceContext>) -> Result<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        // Signaled so the first wait on a fresh slot does not deadlock
        let fence_info = vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::SIGNALED);

        unsafe {
            Ok(Self {
                image_available: device
                    .device
                    .create_semaphore(&semaphore_info, None)
                    .context("Failed to create image-available semaphore")?,
                render_finished: device
                    .device
                    .create_semaphore(&semaphore_info, None)
                    .context("Failed to create render-finished semaphore")?,
                in_flight: device
                    .device
                    .create_fence(&fence_info, None)
                    .context("Failed to create in-flight fence")?,
            })
        }
    }

    pub fn destroy(&self, device: &ash::Device) {
        unsafe {
            device.destroy_semaphore(self.image_available, None);
            device.destroy_semaphore(self.render_finished, None);
            device.destroy_fence(self.in_flight, None);
        }
    }
}

/// Round-robin slot advance: `(current + 1) mod K`, always within `[0, K)`.
pub fn next_slot(current: usize, slot_count: usize) -> usize {
    (current + 1) % slot_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_advance_stays_in_range_and_cycles() {
        let k = 2;
        let mut slot = 0;
        for _ in 0..10 {
            slot = next_slot(slot, k);
            assert!(slot < k);
        }
        assert_eq!(next_slot(0, k), 1);
        assert_eq!(next_slot(1, k), 0);
    }
}
