//! egui toolbar exposing the explorer's tunable parameters.

use std::time::Duration;

use egui::{Context, DragValue};

use crate::core::field::FractalField;
use crate::core::palette::PaletteMode;

pub struct ToolbarStatus {
    pub window_size: (u32, u32),
    pub last_recompute: Option<Duration>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarActions {
    pub quit: bool,
}

/// Draws the parameter toolbar and applies edits to the field.
///
/// Widgets write back every frame; the field's equality short-circuit
/// keeps untouched frames from recomputing.
pub fn draw(ctx: &Context, field: &mut FractalField, status: &ToolbarStatus) -> ToolbarActions {
    let mut actions = ToolbarActions::default();

    egui::Window::new("Explorer")
        .default_pos([10.0, 10.0])
        .default_size([280.0, 300.0])
        .show(ctx, |ui| {
            ui.heading("Fractal Explorer");
            ui.separator();

            let mut max_iterations = field.max_iterations();
            ui.horizontal(|ui| {
                ui.label("Max iterations:");
                ui.add(egui::Slider::new(&mut max_iterations, 1..=10_000));
            });
            field
                .set_max_iterations(max_iterations)
                .expect("slider enforces a positive cap");

            let mut exponent = field.exponent();
            ui.horizontal(|ui| {
                ui.label("Exponent:");
                ui.add(DragValue::new(&mut exponent.re).speed(0.05).prefix("re "));
                ui.add(DragValue::new(&mut exponent.im).speed(0.05).prefix("im "));
            });
            field.set_exponent(exponent);

            let mut julia = field.is_julia();
            ui.checkbox(&mut julia, "Julia set");
            field.set_julia(julia);

            let mut starting_z = field.starting_z();
            ui.add_enabled_ui(!field.is_julia(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Starting z:");
                    ui.add(DragValue::new(&mut starting_z.re).speed(0.01).prefix("re "));
                    ui.add(DragValue::new(&mut starting_z.im).speed(0.01).prefix("im "));
                });
            });
            field.set_starting_z(starting_z);

            let mut starting_c = field.starting_c();
            ui.add_enabled_ui(field.is_julia(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("c:");
                    ui.add(DragValue::new(&mut starting_c.re).speed(0.01).prefix("re "));
                    ui.add(DragValue::new(&mut starting_c.im).speed(0.01).prefix("im "));
                });
            });
            field.set_starting_c(starting_c);

            let mut palette = field.palette();
            ui.horizontal(|ui| {
                ui.label("Palette:");
                egui::ComboBox::from_id_source("palette_mode")
                    .selected_text(palette.display_name())
                    .show_ui(ui, |ui| {
                        for &mode in PaletteMode::ALL {
                            ui.selectable_value(&mut palette, mode, mode.display_name());
                        }
                    });
            });
            field.set_palette(palette);

            ui.separator();
            ui.label(format!("Scale: {:.3e}", field.scale()));
            let center = field.center();
            ui.label(format!("Center: {:.6} {:+.6}i", center.re, center.im));

            ui.separator();
            let (width, height) = status.window_size;
            ui.label(format!("Window size: {}x{}", width, height));
            ui.label(format!("Generation: {}", field.completed_generation()));
            if let Some(recompute) = status.last_recompute {
                ui.label(format!("Last recompute: {} ms", recompute.as_millis()));
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset view").clicked() {
                    field.reset();
                }
                if ui.button("Quit").clicked() {
                    actions.quit = true;
                }
            });
        });

    actions
}
