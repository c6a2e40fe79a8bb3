use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use sphaera_engine::render::DisplayMode;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sphaera-viewer")]
#[command(about = "Particle lattice viewer (points, sphere sprites, reflective spheres, skybox)")]
#[command(after_help = "keys: M cycle display mode, B toggle skybox, O toggle sphere object, Esc quit")]
pub struct ViewerOptions {
    /// Number of particles in the lattice
    #[arg(long, default_value_t = 4096)]
    pub particles: usize,

    /// Upload positions once into a shared GPU buffer
    #[arg(long)]
    pub gpu_buffer: bool,

    /// Directory holding ball1.jpg and cubemap1..6.jpg
    #[arg(long, default_value = "textures")]
    pub textures: PathBuf,

    /// Initial display mode: points, sprites or spheres
    #[arg(long, default_value = "points", value_parser = DisplayMode::from_str)]
    pub mode: DisplayMode,

    /// Present without waiting for vblank
    #[arg(long)]
    pub no_vsync: bool,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_gives_defaults() {
        let options = ViewerOptions::try_parse_from(["sphaera-viewer"]).unwrap();
        assert_eq!(options.particles, 4096);
        assert!(!options.gpu_buffer);
        assert_eq!(options.textures, PathBuf::from("textures"));
        assert_eq!(options.mode, DisplayMode::Points);
        assert!(!options.no_vsync);
        assert_eq!(options.log, None);
    }

    #[test]
    fn parses_every_flag() {
        let options = ViewerOptions::try_parse_from([
            "sphaera-viewer",
            "--particles",
            "1000",
            "--gpu-buffer",
            "--textures",
            "assets",
            "--mode",
            "Spheres",
            "--no-vsync",
            "--log",
            "debug",
        ])
        .unwrap();

        assert_eq!(options.particles, 1000);
        assert!(options.gpu_buffer);
        assert_eq!(options.textures, PathBuf::from("assets"));
        assert_eq!(options.mode, DisplayMode::Spheres);
        assert!(options.no_vsync);
        assert_eq!(options.log.as_deref(), Some("debug"));
    }

    #[test]
    fn help_is_reported_as_display_help() {
        let err = ViewerOptions::try_parse_from(["sphaera-viewer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn rejects_bad_input() {
        for args in [
            &["sphaera-viewer", "--particles"][..],
            &["sphaera-viewer", "--particles", "many"],
            &["sphaera-viewer", "--mode", "lines"],
            &["sphaera-viewer", "--frobnicate"],
        ] {
            assert!(ViewerOptions::try_parse_from(args).is_err(), "{args:?}");
        }
    }

    #[test]
    fn bad_mode_names_the_choices() {
        let err = ViewerOptions::try_parse_from(["sphaera-viewer", "--mode", "lines"]).unwrap_err();
        assert!(err.to_string().contains("points, sprites or spheres"));
    }
}
