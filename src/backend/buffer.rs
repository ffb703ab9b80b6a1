// Buffer utilities for vertex, index, uniform, and staging buffers
//
// Every buffer pairs its handle with its backing allocation; the wrapper
// destroys the handle before freeing the memory, exactly once. Device-local
// data goes through a host-visible staging buffer and a single-use copy.

use anyhow::{bail, Context, Result};
use ash::vk;
use std::sync::Arc;

use super::DeviceContext;

/// GPU buffer with its backing memory. Move-only; the destructor issues the
/// destroy/free pair.
pub struct GpuBuffer {
    pub buffer: vk::Buffer,
    pub memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
    device: Arc<DeviceContext>,
}

impl GpuBuffer {
    pub fn new(
        device: &Arc<DeviceContext>,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        memory_properties: vk::MemoryPropertyFlags,
    ) -> Result<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.device.create_buffer(&buffer_info, None) }
            .context("Failed to create buffer")?;

        let requirements = unsafe { device.device.get_buffer_memory_requirements(buffer) };

        let memory_type_index = find_memory_type(
            &device.memory_properties,
            requirements.memory_type_bits,
            memory_properties,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe { device.device.allocate_memory(&alloc_info, None) }
            .context("Failed to allocate buffer memory")?;

        unsafe { device.device.bind_buffer_memory(buffer, memory, 0) }
            .context("Failed to bind buffer memory")?;

        Ok(Self {
            buffer,
            memory,
            size,
            device: device.clone(),
        })
    }

    /// Map, copy `data` in, unmap. The memory must be host-visible and no
    /// GPU command may still be reading it (caller enforces via fences).
    pub fn write<T: bytemuck::Pod>(&self, data: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        check_write_bounds(bytes.len() as vk::DeviceSize, self.size)?;
        unsafe {
            let ptr = self
                .device
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .context("Failed to map buffer memory")?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr as *mut u8, bytes.len());
            self.device.device.unmap_memory(self.memory);
        }
        Ok(())
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_buffer(self.buffer, None);
            self.device.device.free_memory(self.memory, None);
        }
    }
}

/// A write larger than the allocation would run past the mapped range.
fn check_write_bounds(len: vk::DeviceSize, size: vk::DeviceSize) -> Result<()> {
    if len > size {
        bail!("Buffer write of {len} bytes exceeds allocation of {size} bytes");
    }
    Ok(())
}

/// First memory type index whose bits pass `type_filter` and whose property
/// flags are a superset of `properties`. No match is a platform error.
pub fn find_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> Result<u32> {
    for i in 0..memory_properties.memory_type_count {
        let has_type = (type_filter & (1 << i)) != 0;
        let has_properties = memory_properties.memory_types[i as usize]
            .property_flags
            .contains(properties);

        if has_type && has_properties {
            return Ok(i);
        }
    }

    bail!("No memory type satisfies filter {type_filter:#b} with {properties:?}")
}

/// Allocate and begin a throwaway command buffer for one submission.
pub fn begin_single_time_commands(
    device: &DeviceContext,
    command_pool: vk::CommandPool,
) -> Result<vk::CommandBuffer> {
    let alloc_info = vk::CommandBufferAllocateInfo::builder()
        .command_pool(command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(1);

    let command_buffer = unsafe { device.device.allocate_command_buffers(&alloc_info) }
        .context("Failed to allocate single-use command buffer")?[0];

    let begin_info =
        vk::CommandBufferBeginInfo::builder().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

    unsafe { device.device.begin_command_buffer(command_buffer, &begin_info) }
        .context("Failed to begin single-use command buffer")?;

    Ok(command_buffer)
}

/// End, submit to the graphics queue, wait for completion, free.
pub fn end_single_time_commands(
    device: &DeviceContext,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
) -> Result<()> {
    unsafe { device.device.end_command_buffer(command_buffer) }
        .context("Failed to end single-use command buffer")?;

    let command_buffers = [command_buffer];
    let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

    unsafe {
        device
            .device
            .queue_submit(device.graphics_queue, &[submit_info.build()], vk::Fence::null())
            .context("Failed to submit single-use command buffer")?;
        device
            .device
            .queue_wait_idle(device.graphics_queue)
            .context("Failed to wait for single-use submission")?;
        device
            .device
            .free_command_buffers(command_pool, &command_buffers);
    }

    Ok(())
}

fn copy_buffer(
    device: &DeviceContext,
    command_pool: vk::CommandPool,
    src: vk::Buffer,
    dst: vk::Buffer,
    size: vk::DeviceSize,
) -> Result<()> {
    let command_buffer = begin_single_time_commands(device, command_pool)?;

    let region = vk::BufferCopy::builder().size(size).build();
    unsafe {
        device
            .device
            .cmd_copy_buffer(command_buffer, src, dst, &[region]);
    }

    end_single_time_commands(device, command_pool, command_buffer)
}

/// Staged upload: host-visible staging buffer -> device-local destination.
/// Trades an extra copy for correctness on devices without unified memory.
pub fn create_device_local_buffer<T: bytemuck::Pod>(
    device: &Arc<DeviceContext>,
    command_pool: vk::CommandPool,
    usage: vk::BufferUsageFlags,
    data: &[T],
) -> Result<GpuBuffer> {
    let size = std::mem::size_of_val(data) as vk::DeviceSize;

    let staging = GpuBuffer::new(
        device,
        size,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    )?;
    staging.write(data)?;

    let destination = GpuBuffer::new(
        device,
        size,
        vk::BufferUsageFlags::TRANSFER_DST | usage,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
    )?;

    copy_buffer(
        device,
        command_pool,
        staging.buffer,
        destination.buffer,
        size,
    )?;

    // Staging buffer dropped here; the copy has already completed.
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_properties(types: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties::default();
        props.memory_type_count = types.len() as u32;
        for (i, &flags) in types.iter().enumerate() {
            props.memory_types[i].property_flags = flags;
        }
        props
    }

    #[test]
    fn first_matching_memory_type_wins() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        let index = find_memory_type(
            &props,
            0b111,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
        .unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn type_filter_excludes_otherwise_suitable_types() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);

        // Bit 0 masked out: only index 1 may be chosen.
        let index =
            find_memory_type(&props, 0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn oversized_buffer_write_is_rejected() {
        assert!(check_write_bounds(64, 64).is_ok());
        assert!(check_write_bounds(0, 64).is_ok());
        assert!(check_write_bounds(65, 64).is_err());
    }

    #[test]
    fn requested_properties_must_be_a_superset() {
        let props = memory_properties(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);

        let result = find_memory_type(
            &props,
            0b1,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        );
        assert!(result.is_err());
    }
}
