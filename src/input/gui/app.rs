//! Main explorer window and event loop.

use std::error::Error;
use std::time::{Duration, Instant};

use egui::Context;
use egui_winit::State as EguiWinitState;
use log::{error, info};
use winit::{
    dpi::LogicalSize,
    event::{Event, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use crate::config::Config;
use crate::core::field::FractalField;
use crate::input::gui::toolbar::{self, ToolbarStatus};
use crate::presenters::pixels::FramePresenter;

// One wheel notch scales the view by 10%, wheel up zooming in.
const WHEEL_ZOOM_STEP: f64 = 0.1;

struct App {
    field: FractalField,
    presenter: FramePresenter,
    width: u32,
    height: u32,
    cursor: Option<(f64, f64)>,
    last_recompute: Option<Duration>,
    egui_ctx: Context,
    egui_state: EguiWinitState,
    quit_requested: bool,
}

impl App {
    fn new(
        window: &'static Window,
        event_loop: &EventLoop<()>,
        config: &Config,
    ) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        let presenter = FramePresenter::new(window)?;

        let mut field = FractalField::new(config.width, config.height)?;
        if size.width > 0 && size.height > 0 {
            field.relayout(size.width, size.height)?;
        }

        let egui_ctx = Context::default();
        let egui_state = EguiWinitState::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            event_loop,
            Some(scale_factor as f32),
            None, // max_texture_side, use default
        );

        Ok(Self {
            field,
            presenter,
            width: size.width,
            height: size.height,
            cursor: None,
            last_recompute: None,
            egui_ctx,
            egui_state,
            quit_requested: false,
        })
    }

    /// Zooms around a cursor position, keeping the complex point under
    /// the cursor stationary: capture it, rescale, then pan by however
    /// far the rescale moved it.
    fn zoom_at(&mut self, x: f64, y: f64, wheel_y: f64) {
        let desired = self.field.screen_to_complex(x, y);
        self.field.zoom_by(1.0 + -wheel_y * WHEEL_ZOOM_STEP);
        let after = self.field.screen_to_complex(x, y);

        let center = self.field.center();
        self.field.set_center(center + (desired - after));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;

        // Minimized windows report zero-sized frames; skip those rather
        // than handing them to the field or the surface.
        if width == 0 || height == 0 {
            return;
        }

        if let Err(e) = self.presenter.resize(width, height) {
            error!("failed to resize surface: {e}");
            return;
        }
        self.field
            .relayout(width, height)
            .expect("dimensions are non-zero");
    }

    /// Runs the egui frame: draws the toolbar and applies its edits.
    fn update_ui(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);
        let field = &mut self.field;
        let status = ToolbarStatus {
            window_size: (self.width, self.height),
            last_recompute: self.last_recompute,
        };
        let quit_requested = &mut self.quit_requested;

        self.egui_ctx.run(raw_input, |ctx| {
            let actions = toolbar::draw(ctx, field, &status);
            if actions.quit {
                *quit_requested = true;
            }
        })
    }

    /// Renders one frame; returns whether egui wants an immediate repaint
    /// (drags or animations in progress).
    fn redraw(&mut self, window: &Window) -> Result<bool, pixels::Error> {
        let mut egui_output = self.update_ui(window);
        let platform_output = std::mem::take(&mut egui_output.platform_output);
        self.egui_state
            .handle_platform_output(window, platform_output);
        let repaint = egui_output
            .viewport_output
            .values()
            .any(|v| v.repaint_delay.is_zero());

        if self.field.needs_update() {
            let started = Instant::now();
            self.field.update();
            self.last_recompute = Some(started.elapsed());
        }

        self.presenter.blit(self.field.framebuffer());
        self.presenter.render(&self.egui_ctx, egui_output)?;

        Ok(repaint)
    }

    /// Forwards a window event to egui; returns whether egui consumed it.
    fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }
}

/// Opens the explorer window and runs until it is closed.
pub fn run_explorer(config: &Config) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;

    // Leak the window to get the 'static reference pixels needs
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("Fractal Explorer")
            .with_inner_size(LogicalSize::new(
                f64::from(config.width),
                f64::from(config.height),
            ))
            .with_min_inner_size(LogicalSize::new(200.0, 200.0))
            .build(&event_loop)?,
    ));

    let mut app = App::new(window, &event_loop, config)?;
    let mut redraw_pending = true;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let egui_consumed = app.handle_window_event(window, event);

                match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::RedrawRequested => {
                        redraw_pending = false;

                        match app.redraw(window) {
                            Ok(repaint) => {
                                if repaint {
                                    redraw_pending = true;
                                }
                            }
                            Err(e) => {
                                error!("render failed: {e}");
                                elwt.exit();
                            }
                        }
                        if app.quit_requested {
                            elwt.exit();
                        }
                    }
                    WindowEvent::Resized(size) => {
                        app.resize(size.width, size.height);
                        redraw_pending = true;
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        app.egui_ctx.set_pixels_per_point(*scale_factor as f32);
                        let size = window.inner_size();
                        app.resize(size.width, size.height);
                        redraw_pending = true;
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        app.cursor = Some((position.x, position.y));
                        if egui_consumed {
                            redraw_pending = true;
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        if !egui_consumed {
                            let wheel_y = match delta {
                                MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
                                MouseScrollDelta::PixelDelta(pos) => pos.y / 50.0,
                            };
                            if wheel_y != 0.0 {
                                if let Some((x, y)) = app.cursor {
                                    app.zoom_at(x, y, wheel_y);
                                }
                            }
                        }
                        redraw_pending = true;
                    }
                    _ => {
                        if egui_consumed {
                            redraw_pending = true;
                        }
                    }
                }
            }
            Event::AboutToWait => {
                if redraw_pending || app.field.needs_update() {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                info!("explorer shutting down");
            }
            _ => {}
        }
    })?;

    Ok(())
}
