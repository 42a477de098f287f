//! Presenting a camera's window target on a `winit` window.
//!
//! Only built with the `window` feature. The engine rasterises on the CPU,
//! so presenting a frame means uploading the window target's pixels into
//! the surface texture with `queue.write_texture` and presenting it.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flow_rendering::window::WindowPresenter;
//! use winit::window::Window;
//!
//! fn open(window: Arc<Window>) -> anyhow::Result<WindowPresenter> {
//!     let mut presenter = WindowPresenter::new(window)?;
//!     presenter.resize(640, 480);
//!     Ok(presenter)
//! }
//! ```

use std::{iter, sync::Arc};

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use winit::window::Window;

use crate::{backend::EngineCamera, engine::TargetKind};

pub struct WindowPresenter {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl WindowPresenter {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        futures::executor::block_on(Self::new_async(window))
    }

    async fn new_async(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create a surface for the window")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter can present to the window")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flow-rendering presenter"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("Failed to request a device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        if !surface_caps.usages.contains(wgpu::TextureUsages::COPY_DST) {
            bail!("The window surface does not accept copies");
        }
        // Frames hold display values already, so prefer a non-sRGB format.
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| matches!(f, wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Bgra8Unorm))
            .context("The window surface has no 8-bit RGBA or BGRA format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        debug!("Window surface configured as {:?}", format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Show the last frame `camera` rendered into its window target.
    pub fn present(&mut self, camera: &EngineCamera) -> Result<()> {
        let target = camera
            .render_target()
            .context("The camera was destroyed")?;
        if target.kind() != TargetKind::Window {
            bail!("Camera renders into a texture; create a render window first");
        }
        let texture = target.texture().context("The window target was released")?;

        let width = texture.width().min(self.config.width);
        let height = texture.height().min(self.config.height);
        if width != texture.width() || height != texture.height() {
            warn!(
                "Frame {}x{} does not fit the window, presenting {}x{}.",
                texture.width(),
                texture.height(),
                width,
                height
            );
        }
        let mut data = texture.as_bytes().to_vec();
        if self.config.format == wgpu::TextureFormat::Bgra8Unorm {
            data.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
        }

        let (output, suboptimal) = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                debug!("Window not ready, skipping frame.");
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Outdated => {
                debug!("Window surface outdated, reconfiguring.");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Lost => bail!("The window surface was lost"),
            wgpu::CurrentSurfaceTexture::Validation => {
                bail!("Failed to acquire the next surface texture")
            }
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &output.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(texture.width() * 4),
                rows_per_image: Some(texture.height()),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(iter::empty());
        self.window.pre_present_notify();
        output.present();
        if suboptimal {
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }
}
