//! Raster layers shown by the viewer: the OSM base map and the terrain
//! overlays served by the tile backend.

use galileo::error::GalileoError;
use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::layer::RasterTileLayer;
use galileo::tile_schema::TileIndex;
use galileo::{Map, Messenger};

use crate::colormap;

/// Origin of the terrain tile and statistics backend.
pub const API_ROOT: &str = "http://localhost:8080/api/v1";

/// Position of the terrain overlay in the map's layer stack. The base map
/// sits below it, the selection layer above.
pub const OVERLAY_LAYER_INDEX: usize = 1;

/// Terrain rasters served by the backend. Exactly one is shown over the base
/// map at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainLayer {
    /// Grayscale elevation.
    Elevation,
    /// Elevation colored with the hypsometric ramp.
    ElevationColored,
    /// Slope steepness.
    Slope,
    /// Slope direction.
    Aspect,
    /// Terrain ruggedness index.
    Tri,
    /// Topographic position index.
    Tpi,
    /// Shaded relief.
    Hillshade,
}

impl TerrainLayer {
    /// All overlays in the order they appear in the layer switcher.
    pub const ALL: [TerrainLayer; 7] = [
        TerrainLayer::Elevation,
        TerrainLayer::ElevationColored,
        TerrainLayer::Slope,
        TerrainLayer::Aspect,
        TerrainLayer::Tri,
        TerrainLayer::Tpi,
        TerrainLayer::Hillshade,
    ];

    /// Name shown in the layer switcher.
    pub fn title(&self) -> &'static str {
        match self {
            TerrainLayer::Elevation => "Elevation",
            TerrainLayer::ElevationColored => "Elevation with coloramp",
            TerrainLayer::Slope => "Slope",
            TerrainLayer::Aspect => "Aspect",
            TerrainLayer::Tri => "TRI (Terrain Ruggedness Index)",
            TerrainLayer::Tpi => "TPI (Topographic Position Index)",
            TerrainLayer::Hillshade => "Hillshade",
        }
    }

    fn path_segment(&self) -> &'static str {
        match self {
            TerrainLayer::Elevation | TerrainLayer::ElevationColored => "elevation",
            TerrainLayer::Slope => "slope",
            TerrainLayer::Aspect => "aspect",
            TerrainLayer::Tri => "tri",
            TerrainLayer::Tpi => "tpi",
            TerrainLayer::Hillshade => "hillshade",
        }
    }

    /// URL of a single tile of this overlay.
    pub fn tile_url(&self, index: &TileIndex) -> String {
        let url = format!(
            "{API_ROOT}/{segment}/{z}/{x}/{y}",
            segment = self.path_segment(),
            z = index.z,
            x = index.x,
            y = index.y
        );

        match self {
            TerrainLayer::ElevationColored => {
                format!("{url}?colormap={}", colormap::ramp_query_value())
            }
            _ => url,
        }
    }

    /// Creates the raster tile layer requesting this overlay's tiles.
    ///
    /// No file cache is attached: the backend is local, and the colormap
    /// query parameter would make cached entries ambiguous between variants.
    pub fn build(
        &self,
        messenger: Option<impl Messenger + 'static>,
    ) -> Result<RasterTileLayer, GalileoError> {
        let overlay = *self;
        let mut builder =
            RasterTileLayerBuilder::new_rest(move |index: &TileIndex| overlay.tile_url(index));

        if let Some(messenger) = messenger {
            builder = builder.with_messenger(messenger);
        }

        builder.build()
    }
}

impl Default for TerrainLayer {
    fn default() -> Self {
        TerrainLayer::Elevation
    }
}

/// OSM base layer with the standard attribution and a local tile cache.
pub fn osm_layer() -> Result<RasterTileLayer, GalileoError> {
    RasterTileLayerBuilder::new_osm()
        .with_file_cache_checked(".tile_cache")
        .build()
}

/// Replaces the terrain overlay in the map's layer stack. The stack always
/// holds exactly one overlay; switching replaces it in place.
pub fn set_overlay(
    map: &mut Map,
    overlay: TerrainLayer,
    messenger: Option<impl Messenger + 'static>,
) -> Result<(), GalileoError> {
    let layer = overlay.build(messenger)?;
    let layers = map.layers_mut();
    layers.remove(OVERLAY_LAYER_INDEX);
    layers.insert(OVERLAY_LAYER_INDEX, layer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use galileo::{DummyMessenger, MapBuilder};

    use super::*;

    #[test]
    fn tile_urls_follow_backend_layout() {
        let index = TileIndex::new(66, 44, 7);

        assert_eq!(
            TerrainLayer::Elevation.tile_url(&index),
            "http://localhost:8080/api/v1/elevation/7/66/44"
        );
        assert_eq!(
            TerrainLayer::Hillshade.tile_url(&index),
            "http://localhost:8080/api/v1/hillshade/7/66/44"
        );
        assert_eq!(
            TerrainLayer::Tri.tile_url(&index),
            "http://localhost:8080/api/v1/tri/7/66/44"
        );
    }

    #[test]
    fn only_colored_elevation_sends_the_colormap() {
        let index = TileIndex::new(4, 2, 3);

        let colored = TerrainLayer::ElevationColored.tile_url(&index);
        assert!(colored.starts_with("http://localhost:8080/api/v1/elevation/3/4/2?colormap="));

        for overlay in TerrainLayer::ALL {
            if overlay != TerrainLayer::ElevationColored {
                assert!(!overlay.tile_url(&index).contains("colormap"));
            }
        }
    }

    #[test]
    fn switcher_titles_are_unique() {
        let mut titles: Vec<_> = TerrainLayer::ALL.iter().map(|o| o.title()).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), TerrainLayer::ALL.len());
    }

    #[test]
    fn switching_overlays_keeps_a_single_slot() {
        let base = TerrainLayer::Elevation
            .build(None::<DummyMessenger>)
            .expect("failed to create layer");
        let overlay = TerrainLayer::default()
            .build(None::<DummyMessenger>)
            .expect("failed to create layer");
        let top = TerrainLayer::Hillshade
            .build(None::<DummyMessenger>)
            .expect("failed to create layer");

        let mut map = MapBuilder::default()
            .with_layer(base)
            .with_layer(overlay)
            .with_layer(top)
            .build();
        assert_eq!(map.layers().len(), 3);

        set_overlay(&mut map, TerrainLayer::Slope, None::<DummyMessenger>)
            .expect("failed to switch overlay");
        assert_eq!(map.layers().len(), 3);

        set_overlay(&mut map, TerrainLayer::Aspect, None::<DummyMessenger>)
            .expect("failed to switch overlay");
        assert_eq!(map.layers().len(), 3);
    }
}
