//! Shader program compilation.
//!
//! A program is a vertex + fragment WGSL pair linked into a render pipeline.
//! Compilation and linking run inside a validation error scope; failures are
//! logged and produce no pipeline, which callers treat as "draw nothing".

/// Everything needed to compile and link one program.
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub color_format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub depth: Option<wgpu::DepthStencilState>,
}

/// Compiles both stages and links them.
///
/// Returns `None` when either stage fails to compile or the pair fails to
/// link (mismatched interfaces, bad layouts). The driver message is logged.
pub fn compile_program(device: &wgpu::Device, desc: &ProgramDesc<'_>) -> Option<wgpu::RenderPipeline> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_label = format!("{} vertex", desc.label);
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&vertex_label),
        source: wgpu::ShaderSource::Wgsl(desc.vertex_source.into()),
    });

    let fragment_label = format!("{} fragment", desc.label);
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&fragment_label),
        source: wgpu::ShaderSource::Wgsl(desc.fragment_source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &vertex,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: desc.vertex_buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: desc.depth.clone(),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    match pollster::block_on(scope.pop()) {
        Some(err) => {
            log::error!("failed to link program `{}`:\n{err}", desc.label);
            None
        }
        None => {
            log::debug!("linked program `{}`", desc.label);
            Some(pipeline)
        }
    }
}

/// Lazily compiled program, rebuilt only when the surface format changes.
///
/// A failed compile is remembered for that format so the error is logged once
/// instead of every frame.
#[derive(Default)]
pub(crate) struct ProgramSlot {
    format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl ProgramSlot {
    /// Returns the pipeline for `format`, compiling it with `build` if needed.
    pub(crate) fn get_or_compile<F>(
        &mut self,
        format: wgpu::TextureFormat,
        build: F,
    ) -> Option<&wgpu::RenderPipeline>
    where
        F: FnOnce() -> Option<wgpu::RenderPipeline>,
    {
        if self.format != Some(format) {
            self.pipeline = build();
            self.format = Some(format);
        }
        self.pipeline.as_ref()
    }

    /// Returns the pipeline if one was compiled for `format`.
    pub(crate) fn get(&self, format: wgpu::TextureFormat) -> Option<&wgpu::RenderPipeline> {
        if self.format == Some(format) {
            self.pipeline.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX_OK: &str = "
        @vertex
        fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
        }
    ";

    const FRAGMENT_OK: &str = "
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    ";

    /// A headless device, or `None` on machines without an adapter.
    fn headless_device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some(device)
    }

    fn desc<'a>(vertex_source: &'a str, fragment_source: &'a str) -> ProgramDesc<'a> {
        ProgramDesc {
            label: "test program",
            vertex_source,
            fragment_source,
            bind_group_layouts: &[],
            vertex_buffers: &[],
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth: None,
        }
    }

    #[test]
    fn valid_pair_links() {
        let Some(device) = headless_device() else {
            eprintln!("no adapter, skipping");
            return;
        };
        assert!(compile_program(&device, &desc(VERTEX_OK, FRAGMENT_OK)).is_some());
    }

    #[test]
    fn syntax_error_gives_null_program() {
        let Some(device) = headless_device() else {
            eprintln!("no adapter, skipping");
            return;
        };
        let broken = "@vertex fn vs_main( -> {";
        assert!(compile_program(&device, &desc(broken, FRAGMENT_OK)).is_none());
    }

    #[test]
    fn mismatched_interface_gives_null_program() {
        let Some(device) = headless_device() else {
            eprintln!("no adapter, skipping");
            return;
        };
        let needs_input = "
            @fragment
            fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        ";
        assert!(compile_program(&device, &desc(VERTEX_OK, needs_input)).is_none());
    }

    #[test]
    fn failed_compile_is_not_retried_for_same_format() {
        let mut slot = ProgramSlot::default();
        let mut attempts = 0;

        for _ in 0..3 {
            let got = slot.get_or_compile(wgpu::TextureFormat::Bgra8UnormSrgb, || {
                attempts += 1;
                None
            });
            assert!(got.is_none());
        }
        assert_eq!(attempts, 1);
    }

    #[test]
    fn format_change_triggers_recompile() {
        let mut slot = ProgramSlot::default();
        let mut attempts = 0;

        let _ = slot.get_or_compile(wgpu::TextureFormat::Bgra8UnormSrgb, || {
            attempts += 1;
            None
        });
        let _ = slot.get_or_compile(wgpu::TextureFormat::Rgba8UnormSrgb, || {
            attempts += 1;
            None
        });
        assert_eq!(attempts, 2);
    }

    #[test]
    fn get_ignores_other_formats() {
        let mut slot = ProgramSlot::default();
        assert!(slot.get(wgpu::TextureFormat::Bgra8UnormSrgb).is_none());
        let _ = slot.get_or_compile(wgpu::TextureFormat::Bgra8UnormSrgb, || None);
        assert!(slot.get(wgpu::TextureFormat::Rgba8UnormSrgb).is_none());
    }
}
