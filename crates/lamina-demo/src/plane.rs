use std::time::Duration;

use anyhow::Context as _;
use lamina_engine::core::{App, AppControl, FrameCtx, InitCtx};
use lamina_engine::coords::Viewport;
use lamina_engine::input::{InputFrame, InputState};
use lamina_engine::mesh::{Mesh, Vertex, QUAD_INDICES, QUAD_VERTICES};
use lamina_engine::paint::Color;
use lamina_engine::render::shapes::{RectRenderer, TextRenderer};
use lamina_engine::shader::ShaderProgram;
use lamina_engine::time::FpsMeter;
use lamina_gui::{Context, FrameInput, Style};

use crate::overlay::light_overlay;

pub const PLANE_VS: &str = include_str!("shaders/plane_vs.wgsl");
pub const PLANE_FS: &str = include_str!("shaders/plane_fs.wgsl");

/// Name of the fragment-stage light uniform.
pub const LIGHT_UNIFORM: &str = "lightDirection";

/// Light pointing along the quad's normal, so the first frame shows it unlit.
pub const INITIAL_LIGHT: [f32; 3] = [0.0, 0.0, 1.0];

/// Lit quad plus the light-direction overlay.
pub struct PlaneApp {
    program: Option<ShaderProgram>,
    mesh: Option<Mesh>,
    light: [f32; 3],

    gui: Context,
    rects: RectRenderer,
    texts: TextRenderer,

    fps: FpsMeter,
}

impl PlaneApp {
    pub fn new() -> Self {
        Self {
            program: None,
            mesh: None,
            light: INITIAL_LIGHT,
            gui: Context::new(Style::default()),
            rects: RectRenderer::new(),
            texts: TextRenderer::new(),
            fps: FpsMeter::new(Duration::from_secs(2)),
        }
    }
}

impl PlaneApp {
    /// CPU half of a frame: runs the overlay against this frame's input and
    /// returns whether the light was edited.
    fn update(&mut self, input: &InputState, input_frame: &InputFrame, viewport: Viewport) -> bool {
        self.gui.begin_frame(FrameInput::from_engine(input, input_frame), viewport);
        let changed = light_overlay(&mut self.gui, &mut self.light);
        if changed {
            log::trace!("light direction {:?}", self.light);
        }
        changed
    }
}

impl App for PlaneApp {
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> anyhow::Result<()> {
        let info = ctx.gpu.adapter_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let program = ShaderProgram::build(
            ctx.gpu.device(),
            ctx.gpu.surface_format(),
            PLANE_VS,
            PLANE_FS,
            Vertex::layout(),
        )
        .context("building the plane shader program")?;

        let mesh = Mesh::upload(ctx.gpu.device(), &QUAD_VERTICES, &QUAD_INDICES);
        log::debug!("quad uploaded ({} indices)", mesh.index_count());

        self.gui.load_system_font();

        self.program = Some(program);
        self.mesh = Some(mesh);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(fps) = self.fps.frame(ctx.time.now) {
            log::debug!("{fps:.1} fps");
        }

        self.update(ctx.input, ctx.input_frame, ctx.window.logical_size());

        let (Some(program), Some(mesh)) = (self.program.as_mut(), self.mesh.as_ref()) else {
            return AppControl::Continue;
        };
        let (draw_list, fonts) = self.gui.end_frame();

        let light = self.light;
        let rects = &mut self.rects;
        let texts = &mut self.texts;

        ctx.render(Color::BLACK, |rctx, target| {
            program.set_uniform_vec3(rctx.queue, LIGHT_UNIFORM, light);
            {
                let mut rpass = target.begin_overlay_pass("lamina plane");
                program.bind(&mut rpass);
                mesh.draw(&mut rpass);
            }

            rects.render(rctx, target, draw_list);
            texts.render(rctx, target, draw_list, fonts);
        })
    }

    fn on_exit(&mut self) {
        // Program and mesh go before the device does.
        self.program = None;
        self.mesh = None;
        log::debug!("plane resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_engine::coords::Vec2;
    use lamina_engine::input::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};
    use lamina_engine::lighting::shade;
    use crate::overlay::WINDOW_TITLE;
    use lamina_engine::shader::{check_program, vec3_uniform_bytes, ShaderError, ShaderStage};

    #[test]
    fn plane_program_links_against_the_quad_layout() {
        let (vs, fs, iface) = check_program(PLANE_VS, PLANE_FS, &Vertex::attributes()).unwrap();
        assert_eq!(vs.entry_point(), "vs_main");
        assert_eq!(fs.entry_point(), "fs_main");
        assert_eq!(iface.vertex_inputs().collect::<Vec<_>>(), vec![(0, 3), (1, 3)]);
    }

    #[test]
    fn light_uniform_is_a_vec3_at_group0_binding0() {
        let (_, _, iface) = check_program(PLANE_VS, PLANE_FS, &Vertex::attributes()).unwrap();
        let slot = iface.uniform(LIGHT_UNIFORM).expect("lightDirection reflected");
        assert_eq!((slot.group, slot.binding, slot.size), (0, 0, 12));
        assert!(slot.stages.contains(wgpu::ShaderStages::FRAGMENT));
    }

    #[test]
    fn broken_vertex_source_fails_before_any_gpu_work() {
        let broken = PLANE_VS.replace("vec4<f32>(position, 1.0)", "vec4<f32>(position)");
        let err = check_program(&broken, PLANE_FS, &Vertex::attributes()).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
    }

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    /// Applies `events` as one frame's input and runs the CPU update.
    fn step(app: &mut PlaneApp, state: &mut InputState, events: &[InputEvent]) -> bool {
        let mut frame = InputFrame::default();
        for ev in events {
            state.apply_event(&mut frame, ev.clone());
        }
        let changed = app.update(state, &frame, VIEWPORT);
        app.gui.end_frame();
        changed
    }

    #[test]
    fn initial_light_leaves_the_quad_unlit() {
        let [r, g, b, a] = shade(QUAD_VERTICES[0].normal, INITIAL_LIGHT);
        assert!((r - 0.25).abs() < 1e-6 && (g - 0.35).abs() < 1e-6 && (b - 0.1).abs() < 1e-6);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn held_slider_value_uploads_identically_across_frames() {
        let mut app = PlaneApp::new();
        let mut state = InputState::default();
        assert!(!step(&mut app, &mut state, &[]));

        let panel = app.gui.window_rect(WINDOW_TITLE).unwrap();
        let style = app.gui.style();
        // Left end of the first component.
        let grab = panel.origin
            + Vec2::new(style.padding + 1.0, style.title_height + style.padding + style.item_height * 0.5);

        let pressed = step(&mut app, &mut state, &[
            InputEvent::PointerMoved(grab),
            InputEvent::PointerButton { button: MouseButton::Left, state: MouseButtonState::Pressed },
        ]);
        assert!(pressed);
        assert_eq!(app.light, [-1.0, 0.0, 1.0]);

        let bytes = vec3_uniform_bytes(&app.light).to_vec();
        let color = shade(QUAD_VERTICES[0].normal, app.light);
        for _ in 0..2 {
            assert!(!step(&mut app, &mut state, &[]));
            assert_eq!(vec3_uniform_bytes(&app.light), bytes.as_slice());
            assert_eq!(shade(QUAD_VERTICES[0].normal, app.light), color);
        }

        let released = step(&mut app, &mut state, &[InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Released,
        }]);
        assert!(!released);
        assert_eq!(app.light, [-1.0, 0.0, 1.0]);
    }

    #[test]
    fn escape_key_is_not_handled() {
        let mut app = PlaneApp::new();
        let mut state = InputState::default();
        let changed = step(&mut app, &mut state, &[InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            repeat: false,
        }]);
        assert!(!changed);
        assert_eq!(app.light, INITIAL_LIGHT);
    }

    #[test]
    fn new_app_holds_no_gpu_resources() {
        let app = PlaneApp::new();
        assert!(app.program.is_none() && app.mesh.is_none());
        assert_eq!(app.light, INITIAL_LIGHT);
    }
}
