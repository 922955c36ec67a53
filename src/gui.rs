// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use rfd::FileDialog;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::export;
use crate::session::api::EtestBackend;
use crate::session::worker::{FetchMessage, FetchWorker};
use crate::session::DeviceSession;
use crate::wafer::flat::resolve_flat_angle;
use crate::wafer::outline::OutlineOptions;
use crate::wafer::scene::{build_view, MapOptions, WaferView};
use crate::wafer_map;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(244, 67, 54);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);

pub struct WaferViewerApp {
    session: DeviceSession,
    worker: FetchWorker,
    map_options: MapOptions,
    api_base: String,
    query: String,
    skywater_initial: String,
    backend_online: Option<bool>,
    success_message: Option<String>,
}

impl WaferViewerApp {
    pub fn new(config: &AppConfig, backend: Arc<dyn EtestBackend>) -> Self {
        let worker = FetchWorker::new(backend);
        let mut session = DeviceSession::new();

        session.begin_devices_load();
        worker.fetch_devices();
        worker.check_health();

        Self {
            session,
            worker,
            map_options: MapOptions {
                diameter: config.wafer_diameter_px,
                outline: OutlineOptions {
                    style: config.cutout_style,
                    ..Default::default()
                },
            },
            api_base: config.api_base.clone(),
            query: String::new(),
            skywater_initial: String::new(),
            backend_online: None,
            success_message: None,
        }
    }

    fn process_messages(&mut self, ctx: &egui::Context) {
        let messages = self.worker.poll();
        if messages.is_empty() {
            return;
        }

        for message in messages {
            match message {
                FetchMessage::DevicesLoaded(result) => self.session.apply_devices(result),
                FetchMessage::DeviceLoaded(request, result) => {
                    self.session.apply_device_response(&request, *result);
                }
                FetchMessage::Health(online) => self.backend_online = Some(online),
            }
        }
        ctx.request_repaint();
    }

    fn reload_devices(&mut self) {
        self.session.begin_devices_load();
        self.worker.fetch_devices();
        self.worker.check_health();
    }

    fn load_device(&mut self, device: &str) {
        let request = self.session.select_device(device);
        self.worker.fetch_device(request);
    }

    fn handle_device_click(&mut self, device: &str) {
        if self.session.selected_device() == Some(device) {
            self.session.clear_device();
        } else {
            self.load_device(device);
        }
    }

    fn handle_export_mods_csv(&mut self) {
        let Some(device) = self.session.selected_device().map(str::to_string) else {
            return;
        };
        if let Some(file_path) = FileDialog::new()
            .set_file_name(format!("{device}_mods.csv"))
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match export::export_mods_to_csv(self.session.mods(), &file_path) {
                Ok(()) => {
                    self.success_message = Some(format!(
                        "Mods exported successfully to:\n{}",
                        file_path.display()
                    ));
                }
                Err(e) => {
                    self.session
                        .set_error(format!("Failed to export mods CSV: {e}"));
                }
            }
        }
    }

    fn handle_submit(&mut self) {
        let payload = match self.session.submission(&self.skywater_initial) {
            Ok(payload) => payload,
            Err(e) => {
                self.session.set_error(e.to_string());
                return;
            }
        };

        if let Some(file_path) = FileDialog::new()
            .set_file_name(format!("{}_dies.json", payload.device))
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            match export::export_submission(&payload, &file_path) {
                Ok(()) => {
                    self.success_message = Some(format!(
                        "Submitting {} dies for {} by {}",
                        payload.dies.len(),
                        payload.device,
                        payload.skywater_initial
                    ));
                }
                Err(e) => {
                    self.session
                        .set_error(format!("Failed to save submission: {e}"));
                }
            }
        }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Reload Devices").clicked() {
                    self.reload_devices();
                    ui.close_menu();
                }
                ui.separator();
                let has_mods = !self.session.mods().is_empty();
                if ui
                    .add_enabled(has_mods, egui::Button::new("Export Mods CSV..."))
                    .clicked()
                {
                    self.handle_export_mods_csv();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.backend_online {
                Some(true) => ui.colored_label(SUCCESS_COLOR, "● Backend online"),
                Some(false) => ui.colored_label(ERROR_COLOR, "● Backend unreachable"),
                None => ui.label("● Checking backend..."),
            };
            ui.label(&self.api_base);
            ui.separator();
            ui.label(format!("Devices: {}", self.session.devices().len()));
            ui.separator();
            ui.label(format!("Selected dies: {}", self.session.selection().len()));
        });
    }

    fn render_device_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Device");

        let mut enter_pressed = false;
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text("Type to filter… (e.g., 5CC9 8000)"),
            );
            enter_pressed =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Clear").clicked() {
                self.query.clear();
                self.session.clear_device();
            }
        });

        let filtered: Vec<String> = self
            .session
            .filtered_devices(&self.query)
            .into_iter()
            .map(str::to_string)
            .collect();
        ui.small(format!(
            "Showing {} of {}",
            filtered.len(),
            self.session.devices().len()
        ));

        if enter_pressed && filtered.len() == 1 {
            self.load_device(&filtered[0]);
        }

        if self.session.devices_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading device list…");
            });
        }

        ui.separator();

        let mut clicked_device = None;
        egui::ScrollArea::vertical()
            .id_salt("device_list")
            .max_height(ui.available_height() * 0.45)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for device in &filtered {
                    let checked = self.session.selected_device() == Some(device.as_str());
                    let label = egui::RichText::new(device).monospace();
                    if ui.selectable_label(checked, label).clicked() {
                        clicked_device = Some(device.clone());
                    }
                }
            });
        if let Some(device) = clicked_device {
            self.handle_device_click(&device);
        }

        if self.session.selected_device().is_some() {
            ui.separator();
            self.render_mods_table(ui);
        }
    }

    fn render_mods_table(&self, ui: &mut egui::Ui) {
        ui.heading("Mods");
        let mods = self.session.mods();
        if mods.is_empty() {
            ui.label("No mods.");
            return;
        }

        let fmt_coord = |v: Option<f64>| v.map(|v| format!("{v}")).unwrap_or_default();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::remainder().at_least(120.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(60.0))
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Mod");
                });
                header.col(|ui| {
                    ui.strong("X");
                });
                header.col(|ui| {
                    ui.strong("Y");
                });
            })
            .body(|body| {
                body.rows(18.0, mods.len(), |mut row| {
                    let m = &mods[row.index()];
                    row.col(|ui| {
                        ui.monospace(&m.name);
                    });
                    row.col(|ui| {
                        ui.monospace(fmt_coord(m.x));
                    });
                    row.col(|ui| {
                        ui.monospace(fmt_coord(m.y));
                    });
                });
            });
    }

    fn render_submit_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Submit");
        ui.label("Skywater initial");
        ui.add(
            egui::TextEdit::singleline(&mut self.skywater_initial)
                .hint_text("Enter initials")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(8.0);

        let submit = egui::Button::new(egui::RichText::new("Submit").size(20.0))
            .fill(egui::Color32::from_rgb(22, 163, 74))
            .min_size(egui::vec2(ui.available_width(), 48.0));
        if ui
            .add(submit)
            .on_hover_text("Submit selected dies")
            .clicked()
        {
            self.handle_submit();
        }
        ui.label(format!("Selected dies: {}", self.session.selection().len()));

        ui.separator();
        self.render_wafer_info(ui);
    }

    fn render_wafer_info(&self, ui: &mut egui::Ui) {
        ui.heading("Wafer");
        let Some(wafer) = self.session.wafer() else {
            ui.label("No wafer loaded");
            return;
        };

        ui.monospace(format!("Device: {}", wafer.device));
        ui.monospace(format!(
            "Dies: {}",
            wafer.dies.as_ref().map_or(0, |d| d.len())
        ));
        if !wafer.rejected.is_empty() {
            ui.colored_label(
                ERROR_COLOR,
                format!("Skipped {} malformed coordinates", wafer.rejected.len()),
            );
        }

        let flat = match resolve_flat_angle(wafer.meta.as_ref()) {
            Some(angle) => format!("{angle:.0}°"),
            None => "none".to_string(),
        };
        ui.monospace(format!("Flat: {flat}"));

        if let Some(center) = self.session.center_die() {
            ui.monospace(format!("Center die: ({}, {})", center.x, center.y));
            ui.monospace(format!(
                "Center offset: ({}, {}) µm",
                center.offset_x_um, center.offset_y_um
            ));
        }

        if let Some(meta) = &wafer.meta {
            if let Some(desc) = meta.desc.as_deref().filter(|d| !d.is_empty()) {
                ui.monospace(format!("Desc: {desc}"));
            }
            if let (Some(sx), Some(sy)) = (meta.step_x_um, meta.step_y_um) {
                ui.monospace(format!("Step: {sx} x {sy} µm"));
            }
            if let Some(align) = meta.align_die {
                ui.monospace(format!("Align die: ({}, {})", align.x, align.y));
            }
            if let Some(module) = meta.align_module.as_deref().filter(|m| !m.is_empty()) {
                ui.monospace(format!("Align module: {module}"));
            }
        }
    }

    fn render_wafer_map(&mut self, ui: &mut egui::Ui) {
        ui.heading("Wafer Map");

        if self.session.selected_device().is_none() {
            ui.label("Select a device to view its wafer map.");
            return;
        }

        ui.horizontal(|ui| {
            if ui.button("Select All").clicked() {
                self.session.select_all();
            }
            if ui.button("Unselect All").clicked() {
                self.session.unselect_all();
            }
            if ui.button("Reload").clicked() {
                if let Some(device) = self.session.selected_device().map(str::to_string) {
                    self.load_device(&device);
                }
            }
        });

        if self.session.is_loading_device() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading wafer map…");
            });
            return;
        }

        let view = build_view(
            self.session.die_set(),
            self.session.wafer_meta(),
            self.session.selection(),
            &self.map_options,
        );

        match view {
            WaferView::NoData => {
                ui.label("No wafer map available.");
            }
            WaferView::Map(scene) => {
                let response = egui::ScrollArea::both()
                    .id_salt("wafer_map")
                    .show(ui, |ui| wafer_map::show(ui, &scene))
                    .inner;
                if let Some(die) = response.clicked {
                    self.session.toggle_die(&die);
                }
            }
        }
    }
}

impl eframe::App for WaferViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages(ctx);

        if self.session.devices_loading() || self.session.is_loading_device() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let Some(error) = self.session.error().map(str::to_string) {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(ERROR_COLOR, error);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.session.dismiss_error();
                        }
                    });
                });
        }

        if let Some(success) = &self.success_message.clone() {
            egui::Window::new("Success")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.colored_label(SUCCESS_COLOR, success);
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.allocate_space(egui::Vec2::new(ui.available_width() / 2.0 - 25.0, 0.0));
                        if ui.button("OK").clicked() {
                            self.success_message = None;
                        }
                    });
                });
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        egui::SidePanel::left("device_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                self.render_device_panel(ui);
            });

        if self.session.selected_device().is_some() {
            egui::SidePanel::right("submit_panel")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    self.render_submit_panel(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Etest Program Generator");
            self.render_wafer_map(ui);
        });
    }
}
