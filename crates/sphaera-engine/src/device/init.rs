/// How the GPU layer picks its adapter and configures the surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends to enumerate. Defaults to `WGPU_BACKEND` when set, else all.
    pub backends: wgpu::Backends,

    /// Particle counts in the tens of thousands favor the discrete GPU.
    pub power_preference: wgpu::PowerPreference,

    /// Pick an sRGB surface format when the surface offers one. Textures are
    /// uploaded as sRGB, so a linear surface renders them too dark.
    pub prefer_srgb: bool,

    /// `Fifo` (vsync) is the only mode every platform supports.
    pub present_mode: wgpu::PresentMode,

    /// Requested alpha mode; ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the presentation engine may queue. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Same settings with vsync turned off where the platform allows it.
    pub fn without_vsync(self) -> Self {
        Self {
            present_mode: wgpu::PresentMode::AutoNoVsync,
            ..self
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all()),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
