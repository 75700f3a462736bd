//! Map viewer for terrain analysis raster layers.
//!
//! Shows an OSM base map with one of several terrain rasters (elevation,
//! slope, aspect, ruggedness, hillshade) served by a local tile backend on
//! top. A rectangle selection tool requests elevation statistics for the
//! drawn area and shows the returned JSON.

mod app;
mod colormap;
mod draw;
mod layers;
mod stats;

use std::sync::Arc;

use galileo::control::UserEventHandler;
use galileo::{DummyMessenger, Map, MapBuilder};
use parking_lot::RwLock;

use crate::app::TerrainViewerApp;
use crate::draw::{DrawState, RectangleDrawHandler, SelectionLayer};
use crate::layers::TerrainLayer;

const INITIAL_LATITUDE: f64 = 48.8566;
const INITIAL_LONGITUDE: f64 = 2.3522;
const INITIAL_Z_LEVEL: u32 = 2;

fn main() {
    let selection = Arc::new(RwLock::new(draw::selection_layer()));
    let draw_state = Arc::new(RwLock::new(DrawState::default()));

    let handler = RectangleDrawHandler::new(selection.clone(), draw_state.clone());

    galileo_egui::InitBuilder::new(create_map(selection))
        .with_handlers([Box::new(handler) as Box<dyn UserEventHandler>])
        .with_app_builder(move |egui_map_state| {
            Box::new(TerrainViewerApp::new(egui_map_state, draw_state))
        })
        .init()
        .expect("failed to initialize");
}

fn create_map(selection: Arc<RwLock<SelectionLayer>>) -> Map {
    let base_layer = layers::osm_layer().expect("failed to create base layer");
    let overlay = TerrainLayer::default()
        .build(None::<DummyMessenger>)
        .expect("failed to create overlay layer");

    MapBuilder::default()
        .with_latlon(INITIAL_LATITUDE, INITIAL_LONGITUDE)
        .with_z_level(INITIAL_Z_LEVEL)
        .with_layer(base_layer)
        .with_layer(overlay)
        .with_layer(selection)
        .build()
}
