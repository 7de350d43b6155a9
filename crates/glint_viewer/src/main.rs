use anyhow::{bail, Context, Result};
use glint_core::{
    generate_spheres, load_settings, save_json, GroundSettings, SphereGenerationSettings, Watched,
};
use glint_math::{Camera, Vec3};
use glint_renderer::{FrameStatus, ProgressiveRenderer, RenderSettings, Viewport};
use std::path::PathBuf;
use std::time::Instant;

mod plan_view;
mod snapshot;

use plan_view::PlanViewKernel;
use snapshot::{save_png, SnapshotPresenter};

const USAGE: &str = "usage: glint_viewer [--settings FILE] [--ground FILE] [--render FILE] [--seed N] \
[--size WxH] [--resize FRAME:WxH] [--frames N] [--orbit RADIANS] [--checkpoint N] [--output FILE.png] \
[--dump-scene FILE.json]";

/// Command line options
#[derive(Debug, Clone, PartialEq)]
struct Options {
    settings: Option<PathBuf>,
    ground: Option<PathBuf>,
    render: Option<PathBuf>,
    seed: Option<i32>,
    width: u32,
    height: u32,
    /// Switch to a new size before this frame index
    resize: Option<(u32, u32, u32)>,
    frames: u32,
    orbit: f32,
    checkpoint: u32,
    output: PathBuf,
    dump_scene: Option<PathBuf>,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings: None,
            ground: None,
            render: None,
            seed: None,
            width: 640,
            height: 480,
            resize: None,
            frames: 64,
            orbit: 0.0,
            checkpoint: 0,
            output: PathBuf::from("glint.png"),
            dump_scene: None,
            help: false,
        }
    }
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("{} needs a value\n{}", flag, USAGE))
            };
            match flag.as_str() {
                "--settings" => options.settings = Some(PathBuf::from(value()?)),
                "--ground" => options.ground = Some(PathBuf::from(value()?)),
                "--render" => options.render = Some(PathBuf::from(value()?)),
                "--seed" => options.seed = Some(value()?.parse().context("--seed")?),
                "--size" => (options.width, options.height) = parse_size(&value()?)?,
                "--resize" => {
                    let spec = value()?;
                    let (frame, size) = spec
                        .split_once(':')
                        .with_context(|| format!("--resize expects FRAME:WxH, got {}", spec))?;
                    let (width, height) = parse_size(size)?;
                    options.resize = Some((frame.parse().context("--resize frame")?, width, height));
                }
                "--frames" => options.frames = value()?.parse().context("--frames")?,
                "--orbit" => options.orbit = value()?.parse().context("--orbit")?,
                "--checkpoint" => options.checkpoint = value()?.parse().context("--checkpoint")?,
                "--output" => options.output = PathBuf::from(value()?),
                "--dump-scene" => options.dump_scene = Some(PathBuf::from(value()?)),
                "--help" | "-h" => options.help = true,
                other => bail!("unknown argument {}\n{}", other, USAGE),
            }
        }

        Ok(options)
    }
}

fn parse_size(size: &str) -> Result<(u32, u32)> {
    let (w, h) = size
        .split_once('x')
        .with_context(|| format!("size expects WxH, got {}", size))?;
    Ok((w.parse().context("width")?, h.parse().context("height")?))
}

/// Host loop state
struct App {
    renderer: ProgressiveRenderer,
    spheres: Watched<SphereGenerationSettings>,
    ground: Watched<GroundSettings>,
    camera: Camera,
    viewport: Viewport,
    orbit: f32,
}

impl App {
    fn new(options: &Options) -> Result<Self> {
        let mut sphere_settings: SphereGenerationSettings = match &options.settings {
            Some(path) => load_settings(path)?,
            None => SphereGenerationSettings::default(),
        };
        if let Some(seed) = options.seed {
            sphere_settings.seed = seed;
        }
        let ground_settings: GroundSettings = match &options.ground {
            Some(path) => load_settings(path)?,
            None => GroundSettings::default(),
        };
        let render_settings: RenderSettings = match &options.render {
            Some(path) => load_settings(path)?,
            None => RenderSettings::default(),
        };

        let viewport = Viewport::new(options.width, options.height);
        let reach = sphere_settings.placement_radius.max(10.0);
        let camera = Camera::new(
            Vec3::new(0.0, reach * 0.6, reach * 1.4),
            Vec3::ZERO,
            viewport.aspect(),
        );

        let mut renderer = ProgressiveRenderer::new(render_settings);
        renderer.set_kernel(Box::new(PlanViewKernel::new()));
        if options.checkpoint > 0 {
            renderer.set_presenter(Box::new(SnapshotPresenter::new(
                options.output.clone(),
                options.checkpoint,
            )));
        }

        Ok(Self {
            renderer,
            spheres: Watched::new(sphere_settings),
            ground: Watched::new(ground_settings),
            camera,
            viewport,
            orbit: options.orbit,
        })
    }

    /// One host tick: pick up configuration edits, move the camera, render.
    fn tick(&mut self) -> Result<FrameStatus> {
        self.renderer.on_config_changed(&mut self.spheres, &mut self.ground);
        if self.orbit != 0.0 {
            self.camera.orbit_y(self.orbit);
        }
        Ok(self.renderer.render_frame(self.viewport, &self.camera)?)
    }

    /// Host window resized: keep the camera's aspect in step and resize the
    /// accumulation buffers now rather than on the next frame.
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.viewport = Viewport::new(width, height);
        if !self.viewport.is_empty() {
            self.camera.set_aspect(self.viewport.aspect());
        }
        self.renderer.notify_viewport_changed(width, height)?;
        log::info!("Viewport resized to {}x{}", width, height);
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Glint Viewer");

    let options = Options::parse(std::env::args().skip(1))?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }
    let mut app = App::new(&options)?;

    if let Some(path) = &options.dump_scene {
        let spheres = generate_spheres(&app.spheres);
        save_json(&spheres, path)?;
        log::info!("Wrote {} spheres to {}", spheres.len(), path.display());
    }

    let start = Instant::now();
    let mut rendered = 0;
    for frame in 0..options.frames {
        if let Some((at, width, height)) = options.resize {
            if frame == at {
                app.resize(width, height)?;
            }
        }
        if let FrameStatus::Rendered { .. } = app.tick()? {
            rendered += 1;
        }
    }
    log::info!(
        "Rendered {} frames in {:?}, {} samples accumulated",
        rendered,
        start.elapsed(),
        app.renderer.sample_count()
    );

    if rendered > 0 {
        save_png(app.renderer.converged(), &options.output)?;
        log::info!("Saved {}", options.output.display());
    }

    Ok(())
}
