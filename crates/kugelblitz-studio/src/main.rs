use std::rc::Rc;

use anyhow::{Context, Result, bail};
use kugelblitz_engine::core::{App, AppControl, FrameCtx};
use kugelblitz_engine::device::DeviceInit;
use kugelblitz_engine::gl::Gl;
use kugelblitz_engine::logging::{LoggingConfig, init_logging};
use kugelblitz_engine::render::{Mesh, TRIANGLE_COLORED, TRIANGLE_POSITIONS, VertexLayout};
use kugelblitz_engine::shader::{Preset, ShaderProgram};
use kugelblitz_engine::window::{Runtime, RuntimeConfig};

const USAGE: &str = "usage: kugelblitz-studio [solid|color] [--verbose]";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Options {
    preset: Preset,
    verbose: bool,
}

fn parse_options<I>(args: I) -> Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut preset_seen = false;

    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => options.verbose = true,
            flag if flag.starts_with('-') => bail!("unknown flag `{flag}`\n{USAGE}"),
            name if !preset_seen => {
                options.preset = name.parse().context(USAGE)?;
                preset_seen = true;
            }
            extra => bail!("unexpected argument `{extra}`\n{USAGE}"),
        }
    }

    Ok(options)
}

/// Clears the screen and draws one triangle per frame.
struct TriangleApp {
    mesh: Mesh,
    program: ShaderProgram,
    verbose: bool,
}

impl TriangleApp {
    fn new(gl: &Rc<Gl>, options: &Options) -> Result<Self> {
        let program = ShaderProgram::new(gl, &options.preset.source(), options.verbose)
            .with_context(|| format!("failed to build `{}` shader", options.preset.name()))?;

        let (vertices, layout) = match options.preset {
            Preset::Solid => (&TRIANGLE_POSITIONS[..], VertexLayout::positions()),
            Preset::VertexColor => (&TRIANGLE_COLORED[..], VertexLayout::positions_colors()),
        };
        let mesh = Mesh::new(gl, vertices, &layout).context("failed to upload triangle")?;

        log::info!(
            "renderer ready: `{}` preset, {} vertices",
            options.preset.name(),
            mesh.vertex_count()
        );

        Ok(Self {
            mesh,
            program,
            verbose: options.verbose,
        })
    }
}

impl App for TriangleApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        ctx.clear();

        let active = self.program.activate();
        self.mesh.draw(&active);

        if self.verbose {
            if let Err(e) = ctx.check_error("triangle draw") {
                log::warn!("frame {}: {e}", ctx.time.frame_index);
            }
        }

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let options = parse_options(std::env::args().skip(1))?;
    log::info!("starting Kugelblitz Engine");

    Runtime::run(RuntimeConfig::default(), DeviceInit::default(), move |gl| {
        TriangleApp::new(gl, &options)
    })?;

    log::info!("the program ran successfully");
    Ok(())
}
