//! Particle viewer: a static lattice of particles, an orbiting camera and a
//! reflective sphere, rendered with the sphaera particle renderer.

mod camera;
mod lattice;
mod options;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use sphaera_engine::core::{App, AppControl, FrameCtx};
use sphaera_engine::device::GpuInit;
use sphaera_engine::logging::{init_logging, LoggingConfig};
use sphaera_engine::render::{
    DisplayMode, ParticleRenderer, ParticleRendererConfig, RenderCtx, TexturePaths,
};
use sphaera_engine::window::{Runtime, RuntimeConfig};

use camera::OrbitCamera;
use options::ViewerOptions;

const SPACING: f32 = 0.15;
const FOV_DEGREES: f32 = 60.0;
const CLEAR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.02, b: 0.03, a: 1.0 };

struct Viewer {
    options: ViewerOptions,
    positions: Vec<f32>,
    camera: OrbitCamera,
    object_radius: f32,

    mode: DisplayMode,
    show_skybox: bool,
    show_object: bool,

    // Created on the first frame, once a device exists.
    renderer: Option<ParticleRenderer>,
}

impl Viewer {
    fn new(options: ViewerOptions) -> Self {
        let positions = lattice::lattice(options.particles, SPACING);
        let half = lattice::half_extent(options.particles, SPACING).max(SPACING);

        Self {
            mode: options.mode,
            positions,
            camera: OrbitCamera::new(Vec3::ZERO, half * 4.0, FOV_DEGREES),
            object_radius: half * 0.35,
            show_skybox: true,
            show_object: true,
            renderer: None,
            options,
        }
    }

    fn on_key(&mut self, key: Key<&str>) -> AppControl {
        match key {
            Key::Named(NamedKey::Escape) => return AppControl::Exit,
            Key::Character("m" | "M") => {
                self.mode = self.mode.next();
                log::info!("display mode: {}", self.mode);
            }
            Key::Character("b" | "B") => self.show_skybox = !self.show_skybox,
            Key::Character("o" | "O") => self.show_object = !self.show_object,
            _ => {}
        }
        AppControl::Continue
    }
}

fn build_renderer(ctx: &RenderCtx<'_>, options: &ViewerOptions, positions: &[f32]) -> ParticleRenderer {
    let config = ParticleRendererConfig {
        fov_degrees: FOV_DEGREES,
        window_height: ctx.viewport.height,
        textures: TexturePaths::under(&options.textures),
        ..Default::default()
    };
    let mut renderer = ParticleRenderer::new(ctx, config);

    if options.gpu_buffer {
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphaera-viewer positions"),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        renderer.set_vertex_buffer(Arc::new(buffer), options.particles);
    } else {
        renderer.set_positions(positions, options.particles);
    }

    log::info!(
        "{} particles ({} positions), point size {}px, radius {}",
        renderer.num_particles(),
        if options.gpu_buffer { "device" } else { "host" },
        renderer.point_size(),
        renderer.particle_radius()
    );
    renderer
}

impl App for Viewer {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                self.on_key(event.logical_key.as_ref())
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.camera.advance(ctx.time.dt);
        let matrices = self.camera.matrices(ctx.viewport().aspect());
        let object_model = Mat4::from_scale(Vec3::splat(self.object_radius));

        let Self {
            options,
            positions,
            mode,
            show_skybox,
            show_object,
            renderer,
            ..
        } = self;

        ctx.render(CLEAR, |rctx, target| {
            let renderer = renderer.get_or_insert_with(|| build_renderer(rctx, options, positions));
            renderer.set_window_height(rctx.viewport.height);

            if *show_object {
                renderer.draw_sphere_object(
                    rctx,
                    target,
                    matrices.view,
                    object_model,
                    matrices.projection,
                );
            }

            if *show_skybox {
                renderer.display_with_skybox(rctx, target, *mode, &matrices);
            } else {
                renderer.display(rctx, target, *mode, &matrices);
            }
        })
    }
}

fn main() -> Result<()> {
    let options = ViewerOptions::parse();

    init_logging(match &options.log {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    let gpu = if options.no_vsync {
        GpuInit::default().without_vsync()
    } else {
        GpuInit::default()
    };

    let config = RuntimeConfig {
        title: "sphaera viewer".to_string(),
        ..Default::default()
    };
    Runtime::run(config, gpu, Viewer::new(options))
}
