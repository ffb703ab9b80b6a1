// quad-host: minimal Vulkan rendering host
//
// Draws one textured quad per frame while tolerating window resizes and
// transient presentation failures. The interesting part is the resource
// lifecycle and the frame-in-flight synchronization:
//
// per iteration:
//   wait slot fence -> acquire image -> wait image's last-user fence ->
//   record + update uniforms -> submit -> present -> advance slot
//
// Swapchain invalidation (resize, out-of-date, suboptimal) is never handled
// mid-frame; it sets a flag and the rebuild runs at the top of the next
// iteration, after the device is idle.

mod backend;
mod config;
mod geometry;

use anyhow::{bail, Context, Result};
use ash::vk;
use backend::buffer::{create_device_local_buffer, GpuBuffer};
use backend::image::{DepthBuffer, Texture};
use backend::sync::{next_slot, FrameSlot};
use backend::{pipeline, shader, DeviceContext, ImageAcquire, Instance, Surface, Swapchain};
use config::Config;
use geometry::{UniformBufferObject, QUAD_INDICES, QUAD_VERTICES};
use glam::{Mat4, Vec3};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes};

fn main() -> Result<()> {
    init_logging();
    let config = Config::load();

    log::info!("Starting quad-host");
    log::info!(
        "Window: {}x{}, {} frames in flight",
        config.window.width,
        config.window.height,
        config.graphics.max_frames_in_flight
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated abnormally")?;

    // A fatal error inside the loop ends the session cleanly but the
    // process exits non-zero; anyhow prints the chain to stderr.
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();
}

// =============================================================================
// CHAIN-SIZED RESOURCES
// =============================================================================

/// Everything owned by one swapchain image: these stay per-image (not
/// per-slot) because images may be presented out of lockstep with CPU
/// recording.
struct PerImage {
    command_buffer: vk::CommandBuffer,
    uniform_buffer: GpuBuffer,
    descriptor_set: vk::DescriptorSet,
    /// Fence of the slot that last submitted work targeting this image;
    /// null while the image has no in-flight user.
    in_flight: vk::Fence,
}

/// All resources sized to the swapchain, torn down and rebuilt together on
/// invalidation. Frame slots are not part of this: they are independent of
/// image count.
struct FrameResources {
    swapchain: Swapchain,
    render_pass: vk::RenderPass,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    depth: DepthBuffer,
    framebuffers: Vec<vk::Framebuffer>,
    descriptor_pool: vk::DescriptorPool,
    per_image: Vec<PerImage>,
}

impl FrameResources {
    /// Reverse-dependency teardown. The caller must have waited for device
    /// idle; in-flight work referencing these resources is a use-after-free.
    fn destroy(mut self, device: &DeviceContext, command_pool: vk::CommandPool) {
        unsafe {
            let command_buffers: Vec<_> =
                self.per_image.iter().map(|p| p.command_buffer).collect();
            device
                .device
                .free_command_buffers(command_pool, &command_buffers);
            device
                .device
                .destroy_descriptor_pool(self.descriptor_pool, None);
            self.per_image.clear(); // drops the uniform buffers

            for &framebuffer in &self.framebuffers {
                device.device.destroy_framebuffer(framebuffer, None);
            }
            device.device.destroy_pipeline(self.pipeline, None);
            device
                .device
                .destroy_pipeline_layout(self.pipeline_layout, None);
            device.device.destroy_render_pass(self.render_pass, None);
        }
        // Views and the chain itself go last
        drop(self.depth);
        drop(self.swapchain);
    }

    /// Record this image's command buffer: one render pass, one indexed draw.
    fn record_commands(
        &self,
        device: &DeviceContext,
        image_index: usize,
        clear_color: [f32; 4],
        vertex_buffer: vk::Buffer,
        index_buffer: vk::Buffer,
    ) -> Result<()> {
        let cmd = self.per_image[image_index].command_buffer;
        let begin_info = vk::CommandBufferBeginInfo::builder();

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let render_pass_info = vk::RenderPassBeginInfo::builder()
            .render_pass(self.render_pass)
            .framebuffer(self.framebuffers[image_index])
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.swapchain.extent,
            })
            .clear_values(&clear_values);

        unsafe {
            device
                .device
                .begin_command_buffer(cmd, &begin_info)
                .context("Failed to begin command buffer")?;

            device
                .device
                .cmd_begin_render_pass(cmd, &render_pass_info, vk::SubpassContents::INLINE);
            device
                .device
                .cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline);
            device
                .device
                .cmd_bind_vertex_buffers(cmd, 0, &[vertex_buffer], &[0]);
            device
                .device
                .cmd_bind_index_buffer(cmd, index_buffer, 0, vk::IndexType::UINT16);
            device.device.cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline_layout,
                0,
                &[self.per_image[image_index].descriptor_set],
                &[],
            );
            device
                .device
                .cmd_draw_indexed(cmd, QUAD_INDICES.len() as u32, 1, 0, 0, 0);
            device.device.cmd_end_render_pass(cmd);

            device
                .device
                .end_command_buffer(cmd)
                .context("Failed to end command buffer")?;
        }

        Ok(())
    }

    /// Write the time-varying transform into this image's uniform buffer.
    /// Called immediately before submission, after the fence waits.
    fn update_uniform(&self, image_index: usize, elapsed: f32) -> Result<()> {
        let aspect = self.swapchain.extent.width as f32 / self.swapchain.extent.height as f32;

        let mut proj = Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 10.0);
        proj.y_axis.y *= -1.0; // Vulkan clip space: Y points down

        let ubo = UniformBufferObject {
            model: Mat4::from_rotation_z(elapsed * 90f32.to_radians()),
            view: Mat4::look_at_rh(Vec3::new(2.0, 2.0, 2.0), Vec3::ZERO, Vec3::Z),
            proj,
        };

        self.per_image[image_index].uniform_buffer.write(&[ubo])
    }
}

/// Pair each image's command buffer, uniform buffer, and descriptor set by
/// index. The three collections are built independently; a count diverging
/// from the image count is a logic error, never a silent truncation.
fn zip_per_image<U>(
    image_count: usize,
    command_buffers: Vec<vk::CommandBuffer>,
    uniform_buffers: Vec<U>,
    descriptor_sets: Vec<vk::DescriptorSet>,
) -> Result<Vec<(vk::CommandBuffer, U, vk::DescriptorSet)>> {
    if command_buffers.len() != image_count
        || uniform_buffers.len() != image_count
        || descriptor_sets.len() != image_count
    {
        bail!(
            "Per-image resource counts diverged: {} images, {} command buffers, {} uniform buffers, {} descriptor sets",
            image_count,
            command_buffers.len(),
            uniform_buffers.len(),
            descriptor_sets.len(),
        );
    }

    Ok(command_buffers
        .into_iter()
        .zip(uniform_buffers)
        .zip(descriptor_sets)
        .map(|((command_buffer, uniform_buffer), descriptor_set)| {
            (command_buffer, uniform_buffer, descriptor_set)
        })
        .collect())
}

// =============================================================================
// APPLICATION
// =============================================================================

struct App {
    config: Config,
    start_time: Instant,

    window: Option<Arc<Window>>,
    surface: Option<Surface>,
    device: Option<Arc<DeviceContext>>,

    command_pool: vk::CommandPool,
    descriptor_set_layout: vk::DescriptorSetLayout,

    // Static geometry and texture, uploaded once
    vertex_buffer: Option<GpuBuffer>,
    index_buffer: Option<GpuBuffer>,
    texture: Option<Texture>,

    // Chain-sized resources, rebuilt on invalidation
    frame: Option<FrameResources>,

    // K rotating frame-in-flight slots; survive rebuilds
    frame_slots: Vec<FrameSlot>,
    current_slot: usize,
    wait_stages: [vk::PipelineStageFlags; 1],

    needs_rebuild: bool,
    is_minimized: bool,
    fatal: Option<anyhow::Error>,

    frame_count: u32,
    last_fps_update: Instant,
    last_frame_time: Instant,
}

impl App {
    fn new(config: Config) -> Self {
        let now = Instant::now();
        Self {
            config,
            start_time: now,
            window: None,
            surface: None,
            device: None,
            command_pool: vk::CommandPool::null(),
            descriptor_set_layout: vk::DescriptorSetLayout::null(),
            vertex_buffer: None,
            index_buffer: None,
            texture: None,
            frame: None,
            frame_slots: Vec::new(),
            current_slot: 0,
            wait_stages: [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT],
            needs_rebuild: false,
            is_minimized: false,
            fatal: None,
            frame_count: 0,
            last_fps_update: now,
            last_frame_time: now,
        }
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Build everything that lives for the whole session: device, static
    /// buffers, texture, frame slots; then the first chain-sized set.
    fn init_vulkan(&mut self, window: Arc<Window>) -> Result<()> {
        log::info!("Initializing Vulkan");

        let instance = Instance::new(
            &self.config.window.title,
            self.config.debug.validation_layers,
            window.raw_display_handle(),
        )?;
        let surface = Surface::new(
            &instance,
            window.raw_display_handle(),
            window.raw_window_handle(),
        )?;
        let device = DeviceContext::new(instance, &surface)?;

        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(device.graphics_queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let command_pool = unsafe { device.device.create_command_pool(&pool_info, None) }
            .context("Failed to create command pool")?;

        let descriptor_set_layout = pipeline::create_descriptor_set_layout(&device)?;

        // Staged uploads of the hard-coded quad
        let vertex_buffer = create_device_local_buffer(
            &device,
            command_pool,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            &QUAD_VERTICES,
        )?;
        let index_buffer = create_device_local_buffer(
            &device,
            command_pool,
            vk::BufferUsageFlags::INDEX_BUFFER,
            &QUAD_INDICES,
        )?;
        let texture = Texture::from_file(&device, command_pool, &self.config.assets.texture)?;

        let frame_slots = (0..self.config.graphics.max_frames_in_flight)
            .map(|_| FrameSlot::new(&device))
            .collect::<Result<Vec<_>>>()?;

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.command_pool = command_pool;
        self.descriptor_set_layout = descriptor_set_layout;
        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.texture = Some(texture);
        self.frame_slots = frame_slots;

        self.build_frame_resources()?;

        log::info!("Vulkan initialized");
        Ok(())
    }

    /// Build (or rebuild) everything sized to the swapchain. Skipped while
    /// the window is zero-sized; the resize event that restores it triggers
    /// the rebuild.
    fn build_frame_resources(&mut self) -> Result<()> {
        let device = self.device.as_ref().context("Device not initialized")?.clone();
        let surface = self.surface.as_ref().context("Surface not initialized")?;
        let window = self.window.as_ref().context("Window not initialized")?;

        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            self.is_minimized = true;
            return Ok(());
        }
        self.is_minimized = false;

        // The surface can only have one swapchain at a time
        if let Some(old) = self.frame.take() {
            old.destroy(&device, self.command_pool);
        }

        let swapchain = Swapchain::new(device.clone(), surface, size.width, size.height)?;
        let render_pass = pipeline::create_render_pass(&device, swapchain.format)?;

        // Shader blobs are read fresh from disk at every pipeline build
        let vert_shader =
            shader::load_shader_module(&device, &self.config.assets.vertex_shader)?;
        let frag_shader =
            shader::load_shader_module(&device, &self.config.assets.fragment_shader)?;
        let pipeline_result = pipeline::create_graphics_pipeline(
            &device,
            render_pass,
            swapchain.extent,
            self.descriptor_set_layout,
            vert_shader,
            frag_shader,
        );
        unsafe {
            device.device.destroy_shader_module(vert_shader, None);
            device.device.destroy_shader_module(frag_shader, None);
        }
        let (graphics_pipeline, pipeline_layout) = pipeline_result?;

        let depth = DepthBuffer::new(&device, swapchain.extent)?;
        let framebuffers = pipeline::create_framebuffers(
            &device,
            &swapchain.image_views,
            depth.view,
            render_pass,
            swapchain.extent,
        )?;

        let image_count = swapchain.images.len();

        let uniform_buffers = (0..image_count)
            .map(|_| {
                GpuBuffer::new(
                    &device,
                    std::mem::size_of::<UniformBufferObject>() as vk::DeviceSize,
                    vk::BufferUsageFlags::UNIFORM_BUFFER,
                    vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let descriptor_pool = pipeline::create_descriptor_pool(&device, image_count as u32)?;
        let texture = self.texture.as_ref().context("Texture not initialized")?;
        let buffer_handles: Vec<_> = uniform_buffers.iter().map(|b| b.buffer).collect();
        let descriptor_sets = pipeline::create_descriptor_sets(
            &device,
            descriptor_pool,
            self.descriptor_set_layout,
            &buffer_handles,
            texture.view,
            texture.sampler,
        )?;

        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(image_count as u32);
        let command_buffers = unsafe { device.device.allocate_command_buffers(&alloc_info) }
            .context("Failed to allocate command buffers")?;

        let per_image = zip_per_image(image_count, command_buffers, uniform_buffers, descriptor_sets)?
            .into_iter()
            .map(|(command_buffer, uniform_buffer, descriptor_set)| PerImage {
                command_buffer,
                uniform_buffer,
                descriptor_set,
                in_flight: vk::Fence::null(),
            })
            .collect();

        self.frame = Some(FrameResources {
            swapchain,
            render_pass,
            pipeline_layout,
            pipeline: graphics_pipeline,
            depth,
            framebuffers,
            descriptor_pool,
            per_image,
        });
        self.needs_rebuild = false;

        log::info!("Built chain-sized resources for {} images", image_count);
        Ok(())
    }

    /// Deferred rebuild: runs only at the top of an iteration, never while a
    /// command buffer referencing the old resources may be in flight.
    fn rebuild_swapchain(&mut self) -> Result<()> {
        if let Some(ref device) = self.device {
            device.wait_idle()?;
        }
        self.build_frame_resources()
    }

    // =========================================================================
    // FRAME SCHEDULER
    // =========================================================================

    /// One iteration of the steady-state loop. Returns false when nothing
    /// was presented (minimized or mid-rebuild).
    fn render_frame(&mut self) -> Result<bool> {
        if self.is_minimized {
            return Ok(false);
        }
        if self.needs_rebuild {
            self.rebuild_swapchain()?;
            if self.is_minimized {
                return Ok(false);
            }
        }

        let device = self.device.as_ref().context("Device not initialized")?.clone();
        let slot_count = self.frame_slots.len();
        let slot_fence = self.frame_slots[self.current_slot].in_flight;
        let image_available = self.frame_slots[self.current_slot].image_available;
        let render_finished = self.frame_slots[self.current_slot].render_finished;

        let clear_color = self.config.graphics.clear_color;
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let vertex_buffer = self
            .vertex_buffer
            .as_ref()
            .context("Vertex buffer not initialized")?
            .buffer;
        let index_buffer = self
            .index_buffer
            .as_ref()
            .context("Index buffer not initialized")?
            .buffer;

        // Step 1: wait until this slot's previous command buffer finished
        unsafe {
            device
                .device
                .wait_for_fences(&[slot_fence], true, u64::MAX)
                .context("Failed to wait for frame fence")?;
        }

        let frame = self.frame.as_mut().context("Swapchain not initialized")?;

        // Step 2: acquire the next presentable image
        let (image_index, suboptimal) = match frame.swapchain.acquire_next_image(image_available)?
        {
            ImageAcquire::Acquired { index, suboptimal } => (index as usize, suboptimal),
            ImageAcquire::OutOfDate => {
                self.needs_rebuild = true;
                return Ok(false);
            }
        };
        if suboptimal {
            // Still usable this frame; rebuild at the next iteration
            self.needs_rebuild = true;
        }

        // Step 3: the image may still belong to another slot when K is
        // smaller than the image count
        let image_fence = frame.per_image[image_index].in_flight;
        if image_fence != vk::Fence::null() {
            unsafe {
                device
                    .device
                    .wait_for_fences(&[image_fence], true, u64::MAX)
                    .context("Failed to wait for image fence")?;
            }
        }
        frame.per_image[image_index].in_flight = slot_fence;

        // Step 4: record the per-image command buffer, then write the
        // transform for this frame
        frame.record_commands(&device, image_index, clear_color, vertex_buffer, index_buffer)?;
        frame.update_uniform(image_index, elapsed)?;

        // Step 5: submit, waiting on image-available at color output,
        // signaling render-finished and the slot fence
        let wait_semaphores = [image_available];
        let signal_semaphores = [render_finished];
        let command_buffers = [frame.per_image[image_index].command_buffer];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&self.wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            device
                .device
                .reset_fences(&[slot_fence])
                .context("Failed to reset frame fence")?;
            device
                .device
                .queue_submit(device.graphics_queue, &[submit_info.build()], slot_fence)
                .context("Failed to submit draw command buffer")?;
        }

        // Step 6: present; out-of-date/suboptimal is a resize signal here,
        // not an error
        let needs_rebuild = frame.swapchain.present(
            device.present_queue,
            image_index as u32,
            &[render_finished],
        )?;
        if needs_rebuild {
            self.needs_rebuild = true;
        }

        // Step 7: advance the slot round-robin
        self.current_slot = next_slot(self.current_slot, slot_count);

        Ok(true)
    }

    // =========================================================================
    // FPS TRACKING
    // =========================================================================

    fn update_fps(&mut self) {
        if !self.config.debug.show_fps {
            return;
        }

        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.frame_count += 1;

        if now.duration_since(self.last_fps_update).as_secs_f32() >= 1.0 {
            let elapsed = now.duration_since(self.last_fps_update).as_secs_f32();
            let fps = self.frame_count as f32 / elapsed;

            if let Some(ref window) = self.window {
                window.set_title(&format!(
                    "{} - {:.0} FPS ({:.2}ms)",
                    self.config.window.title,
                    fps,
                    frame_time * 1000.0,
                ));
            }

            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fatal = Some(anyhow::Error::new(e).context("Failed to create window"));
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_vulkan(window) {
            log::error!("Failed to initialize Vulkan: {:#}", e);
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                if let Some(ref device) = self.device {
                    let _ = device.wait_idle();
                }
                event_loop.exit();
            }

            // The rebuild itself is deferred to the next render iteration
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);

                if size.width == 0 || size.height == 0 {
                    self.is_minimized = true;
                } else {
                    self.is_minimized = false;
                    self.needs_rebuild = true;
                    if let Some(ref window) = self.window {
                        window.request_redraw();
                    }
                }
            }

            WindowEvent::RedrawRequested => match self.render_frame() {
                Ok(rendered) => {
                    if rendered {
                        self.update_fps();
                    }
                }
                Err(e) => {
                    log::error!("Render error: {:#}", e);
                    self.fatal = Some(e);
                    event_loop.exit();
                }
            },

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed() {
                    if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // While minimized the loop blocks on events; the resize that
        // restores the window restarts redraws.
        if self.is_minimized {
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for App {
    fn drop(&mut self) {
        log::info!("Cleaning up Vulkan resources");

        if let Some(ref device) = self.device {
            // Final barrier: nothing may still be executing
            let _ = device.wait_idle();

            if let Some(frame) = self.frame.take() {
                frame.destroy(device, self.command_pool);
            }

            for slot in &self.frame_slots {
                slot.destroy(&device.device);
            }
            self.frame_slots.clear();

            // Static resources (owning wrappers)
            self.texture = None;
            self.vertex_buffer = None;
            self.index_buffer = None;

            unsafe {
                device
                    .device
                    .destroy_descriptor_set_layout(self.descriptor_set_layout, None);
                device.device.destroy_command_pool(self.command_pool, None);
            }

            if let Some(surface) = self.surface.take() {
                surface.destroy();
            }
            // DeviceContext (device, then instance) drops last
        }

        log::info!("Cleanup complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_image_resources_match_image_count_after_assembly() {
        let command_buffers = vec![vk::CommandBuffer::null(); 3];
        let descriptor_sets = vec![vk::DescriptorSet::null(); 3];
        let per_image =
            zip_per_image(3, command_buffers, vec![0u32; 3], descriptor_sets).unwrap();
        assert_eq!(per_image.len(), 3);
    }

    #[test]
    fn diverging_per_image_counts_are_rejected() {
        let command_buffers = vec![vk::CommandBuffer::null(); 3];
        let descriptor_sets = vec![vk::DescriptorSet::null(); 3];
        assert!(zip_per_image(3, command_buffers, vec![0u32; 2], descriptor_sets).is_err());

        let command_buffers = vec![vk::CommandBuffer::null(); 2];
        let descriptor_sets = vec![vk::DescriptorSet::null(); 2];
        assert!(zip_per_image(3, command_buffers, vec![0u32; 2], descriptor_sets).is_err());
    }
}
