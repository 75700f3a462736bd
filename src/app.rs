//! Application state and UI composition.

use std::sync::Arc;

use galileo_egui::{EguiMap, EguiMapState};
use parking_lot::RwLock;
use serde_json::Value;

use crate::draw::DrawState;
use crate::layers::{self, TerrainLayer};
use crate::stats::StatsClient;

/// The viewer application: the map widget, the layer switcher with the
/// selection tool toggle, and the statistics panel.
pub struct TerrainViewerApp {
    map: EguiMapState,
    active_overlay: TerrainLayer,
    draw_state: Arc<RwLock<DrawState>>,
    stats_client: StatsClient,
    statistics: Arc<RwLock<Option<Value>>>,
}

impl TerrainViewerApp {
    /// Creates the application over an initialized map state. The map is
    /// expected to carry the default overlay.
    pub fn new(map: EguiMapState, draw_state: Arc<RwLock<DrawState>>) -> Self {
        Self {
            map,
            active_overlay: TerrainLayer::default(),
            draw_state,
            stats_client: StatsClient::new(),
            statistics: Arc::new(RwLock::new(None)),
        }
    }

    fn switch_overlay(&mut self, overlay: TerrainLayer) {
        let messenger = self.map.messenger();
        match layers::set_overlay(self.map.map_mut(), overlay, Some(messenger)) {
            Ok(()) => {
                self.active_overlay = overlay;
                self.map.request_redraw();
            }
            Err(err) => log::error!("Failed to switch to layer {}: {err}", overlay.title()),
        }
    }

    /// Starts the statistics request for a freshly completed selection, if
    /// there is one. The response replaces the previous payload entirely;
    /// when several requests are in flight, the last response wins.
    fn spawn_pending_fetch(&self, ctx: &egui::Context) {
        let Some(query) = self.draw_state.write().completed.take() else {
            return;
        };

        log::info!("Requesting elevation statistics: {}", query.url());

        let client = self.stats_client.clone();
        let statistics = self.statistics.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            match client.fetch(&query).await {
                Ok(payload) => {
                    *statistics.write() = Some(payload);
                    ctx.request_repaint();
                }
                Err(err) => log::error!("Elevation statistics request failed: {err}"),
            }
        });
    }

    fn layers_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Layers")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let mut selected = self.active_overlay;
                for overlay in TerrainLayer::ALL {
                    ui.radio_value(&mut selected, overlay, overlay.title());
                }
                if selected != self.active_overlay {
                    self.switch_overlay(selected);
                }

                ui.separator();

                let mut draw_state = self.draw_state.write();
                if ui
                    .selectable_label(draw_state.armed, "Select area")
                    .clicked()
                {
                    draw_state.armed = !draw_state.armed;
                }
            });
    }

    fn statistics_window(&self, ctx: &egui::Context) {
        let statistics = self.statistics.read();
        let Some(payload) = statistics.as_ref() else {
            return;
        };

        egui::Window::new("Elevation statistics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .title_bar(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Elevation statistics:");
                ui.monospace(format_statistics(payload));
            });
    }
}

impl eframe::App for TerrainViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.spawn_pending_fetch(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            EguiMap::new(&mut self.map).show_ui(ui);
        });

        self.layers_window(ctx);
        self.statistics_window(ctx);
    }
}

/// Pretty-prints the payload with 2-space indentation, keys in document
/// order.
fn format_statistics(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}
