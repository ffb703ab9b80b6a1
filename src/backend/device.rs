// Vulkan device context - core GPU interface
//
// Responsibilities:
// - Instance creation with validation layers and extension checks
// - Surface creation and capability queries
// - Physical device selection (queue families, features, extensions)
// - Logical device + graphics/present queue creation

use anyhow::{bail, Context, Result};
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::{CStr, CString};
use std::sync::Arc;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Device extensions every candidate adapter must expose.
const REQUIRED_DEVICE_EXTENSIONS: [&CStr; 1] = [ash::extensions::khr::Swapchain::name()];

/// First queue family index supporting each role. The two roles may land on
/// the same family; if not, two distinct queues are created.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }
}

/// The Vulkan instance plus the debug plumbing that shares its lifetime.
pub struct Instance {
    pub entry: Entry,
    pub handle: ash::Instance,
    debug: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl Instance {
    pub fn new(
        app_name: &str,
        validation_enabled: bool,
        display_handle: RawDisplayHandle,
    ) -> Result<Self> {
        let entry = unsafe { Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;

        // Surface extensions for this platform, plus debug utils when validating
        let mut extensions = ash_window::enumerate_required_extensions(display_handle)
            .context("No Vulkan surface support for this display")?
            .to_vec();
        if validation_enabled {
            extensions.push(DebugUtils::name().as_ptr());
        }

        check_instance_extension_support(&entry, &extensions)?;

        let layer_names = if validation_enabled {
            check_validation_layer_support(&entry)?;
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let app_name_cstr = CString::new(app_name)?;
        let engine_name = CString::new("quad-host")?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_0);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        let handle = unsafe { entry.create_instance(&create_info, None) }
            .context("Failed to create Vulkan instance")?;

        let debug = if validation_enabled {
            Some(create_debug_messenger(&entry, &handle)?)
        } else {
            None
        };

        Ok(Self {
            entry,
            handle,
            debug,
        })
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.handle.destroy_instance(None);
        }
    }
}

/// Presentation target bound to the window. Destroyed explicitly by the
/// owner before the instance goes away.
pub struct Surface {
    pub loader: ash::extensions::khr::Surface,
    pub handle: vk::SurfaceKHR,
}

impl Surface {
    pub fn new(
        instance: &Instance,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<Self> {
        let loader = ash::extensions::khr::Surface::new(&instance.entry, &instance.handle);
        let handle = unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.handle,
                display_handle,
                window_handle,
                None,
            )
        }
        .context("Failed to create window surface")?;

        Ok(Self { loader, handle })
    }

    pub fn destroy(&self) {
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}

/// Selected GPU: physical adapter, logical device, and execution queues.
/// Immutable after creation; destroyed last, after all dependent resources.
pub struct DeviceContext {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub instance: Instance,

    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub graphics_queue_family: u32,
    pub present_queue_family: u32,

    // Cached adapter properties
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
}

impl DeviceContext {
    /// Pick the best-scoring capable adapter and create a logical device on
    /// it. Fails fatally if no adapter qualifies.
    pub fn new(instance: Instance, surface: &Surface) -> Result<Arc<Self>> {
        let (physical_device, families) = pick_physical_device(&instance.handle, surface)?;
        let graphics_queue_family = families.graphics.context("graphics queue family missing")?;
        let present_queue_family = families.present.context("present queue family missing")?;

        let properties = unsafe {
            instance
                .handle
                .get_physical_device_properties(physical_device)
        };
        let memory_properties = unsafe {
            instance
                .handle
                .get_physical_device_memory_properties(physical_device)
        };

        log::info!(
            "Selected GPU: {} (score {})",
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy(),
            adapter_score(&properties),
        );

        let (device, graphics_queue, present_queue) = create_logical_device(
            &instance.handle,
            physical_device,
            graphics_queue_family,
            present_queue_family,
        )?;

        Ok(Arc::new(Self {
            device,
            physical_device,
            instance,
            graphics_queue,
            present_queue,
            graphics_queue_family,
            present_queue_family,
            properties,
            memory_properties,
        }))
    }

    /// Wait for the device to finish all outstanding work.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }.context("Device wait idle failed")?;
        Ok(())
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device");
        let _ = self.wait_idle();
        unsafe {
            self.device.destroy_device(None);
        }
        // Instance (and debug messenger) dropped after the device.
    }
}

fn check_instance_extension_support(
    entry: &Entry,
    required: &[*const std::os::raw::c_char],
) -> Result<()> {
    let available = entry
        .enumerate_instance_extension_properties(None)
        .context("Failed to enumerate instance extensions")?;

    for &req in required {
        let req = unsafe { CStr::from_ptr(req) };
        let found = available
            .iter()
            .any(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) } == req);
        if !found {
            bail!(
                "Required instance extension not supported: {}",
                req.to_string_lossy()
            );
        }
    }
    Ok(())
}

fn check_validation_layer_support(entry: &Entry) -> Result<()> {
    let available = entry
        .enumerate_instance_layer_properties()
        .context("Failed to enumerate instance layers")?;

    let found = available
        .iter()
        .any(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) } == VALIDATION_LAYER);
    if !found {
        bail!(
            "Validation layer not available: {}",
            VALIDATION_LAYER.to_string_lossy()
        );
    }
    Ok(())
}

fn create_debug_messenger(
    entry: &Entry,
    instance: &ash::Instance,
) -> Result<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
    let debug_utils = DebugUtils::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
        .context("Failed to create debug messenger")?;

    Ok((debug_utils, messenger))
}

/// Iterate families once, recording the first index supporting each role;
/// short-circuits once both are found.
fn find_queue_families(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    surface: &Surface,
) -> Result<QueueFamilyIndices> {
    let families =
        unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

    let mut indices = QueueFamilyIndices::default();
    for (i, family) in families.iter().enumerate() {
        let i = i as u32;
        if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            indices.graphics = Some(i);
        }
        if indices.present.is_none() {
            let supported = unsafe {
                surface.loader.get_physical_device_surface_support(
                    physical_device,
                    i,
                    surface.handle,
                )
            }
            .context("Failed to query surface support")?;
            if supported {
                indices.present = Some(i);
            }
        }
        if indices.is_complete() {
            break;
        }
    }
    Ok(indices)
}

fn check_device_extension_support(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<bool> {
    let available = unsafe { instance.enumerate_device_extension_properties(physical_device) }
        .context("Failed to enumerate device extensions")?;

    Ok(REQUIRED_DEVICE_EXTENSIONS.iter().all(|&req| {
        available
            .iter()
            .any(|ext| unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) } == req)
    }))
}

/// Monotonic capability proxy: bigger maximum image dimension wins.
pub fn adapter_score(properties: &vk::PhysicalDeviceProperties) -> u32 {
    properties.limits.max_image_dimension2_d
}

/// An adapter qualifies only with both queue roles, the sampler-anisotropy
/// feature, the swapchain extension, and non-empty format/present-mode sets.
fn is_device_suitable(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    surface: &Surface,
) -> Result<Option<QueueFamilyIndices>> {
    let families = find_queue_families(instance, physical_device, surface)?;
    if !families.is_complete() {
        return Ok(None);
    }

    let features = unsafe { instance.get_physical_device_features(physical_device) };
    if features.sampler_anisotropy != vk::TRUE {
        return Ok(None);
    }

    if !check_device_extension_support(instance, physical_device)? {
        return Ok(None);
    }

    let formats = unsafe {
        surface
            .loader
            .get_physical_device_surface_formats(physical_device, surface.handle)
    }
    .context("Failed to query surface formats")?;
    let present_modes = unsafe {
        surface
            .loader
            .get_physical_device_surface_present_modes(physical_device, surface.handle)
    }
    .context("Failed to query present modes")?;

    if formats.is_empty() || present_modes.is_empty() {
        return Ok(None);
    }

    Ok(Some(families))
}

fn pick_physical_device(
    instance: &ash::Instance,
    surface: &Surface,
) -> Result<(vk::PhysicalDevice, QueueFamilyIndices)> {
    let devices = unsafe { instance.enumerate_physical_devices() }
        .context("Failed to enumerate physical devices")?;

    if devices.is_empty() {
        bail!("No Vulkan-capable GPU found");
    }

    // Highest score wins; ties broken by enumeration order (first wins)
    let mut best: Option<(vk::PhysicalDevice, QueueFamilyIndices)> = None;
    let mut best_score = 0;

    for device in devices {
        let Some(families) = is_device_suitable(instance, device, surface)? else {
            continue;
        };
        let properties = unsafe { instance.get_physical_device_properties(device) };
        let score = adapter_score(&properties);
        if best.is_none() || score > best_score {
            best_score = score;
            best = Some((device, families));
        }
    }

    best.context("No suitable GPU found")
}

fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    graphics_family: u32,
    present_family: u32,
) -> Result<(ash::Device, vk::Queue, vk::Queue)> {
    // One queue per unique family; graphics and present may coincide
    let mut unique_families = vec![graphics_family];
    if present_family != graphics_family {
        unique_families.push(present_family);
    }

    let queue_priorities = [1.0];
    let queue_create_infos: Vec<_> = unique_families
        .iter()
        .map(|&family| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(family)
                .queue_priorities(&queue_priorities)
                .build()
        })
        .collect();

    let features = vk::PhysicalDeviceFeatures::builder().sampler_anisotropy(true);

    let extensions: Vec<_> = REQUIRED_DEVICE_EXTENSIONS
        .iter()
        .map(|ext| ext.as_ptr())
        .collect();

    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = unsafe { instance.create_device(physical_device, &create_info, None) }
        .context("Failed to create logical device")?;

    let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
    let present_queue = unsafe { device.get_device_queue(present_family, 0) };

    Ok((device, graphics_queue, present_queue))
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_family_indices_complete_only_with_both_roles() {
        let mut indices = QueueFamilyIndices::default();
        assert!(!indices.is_complete());
        indices.graphics = Some(0);
        assert!(!indices.is_complete());
        indices.present = Some(0);
        assert!(indices.is_complete());
    }

    #[test]
    fn adapter_score_follows_max_image_dimension() {
        let mut small = vk::PhysicalDeviceProperties::default();
        small.limits.max_image_dimension2_d = 4096;
        let mut large = vk::PhysicalDeviceProperties::default();
        large.limits.max_image_dimension2_d = 16384;
        assert!(adapter_score(&large) > adapter_score(&small));
    }
}
