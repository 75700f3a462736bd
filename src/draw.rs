//! Rectangle selection tool.
//!
//! While the tool is armed, left-button drags draw a selection rectangle
//! instead of panning the map. Releasing the button records the rectangle's
//! geographic extent and the current zoom level as a completed statistics
//! query and disarms the tool.

use std::sync::Arc;

use galileo::control::{EventPropagation, MouseButton, MouseEvent, UserEvent, UserEventHandler};
use galileo::layer::{FeatureId, FeatureLayer};
use galileo::symbol::SimplePolygonSymbol;
use galileo::tile_schema::TileSchema;
use galileo::{Color, Map};
use galileo_types::cartesian::{CartesianPoint2d, Point2 as Point2d};
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Crs, Projection};
use galileo_types::geometry_type::CartesianSpace2d;
use galileo_types::impls::Polygon;
use parking_lot::RwLock;

use crate::stats::{BoundingBox, StatsQuery};

/// Feature layer holding the selection rectangle.
pub type SelectionLayer =
    FeatureLayer<Point2d, Polygon<Point2d>, SimplePolygonSymbol, CartesianSpace2d>;

// The zoom sent to the statistics endpoint follows the base map's schema.
const ZOOM_LEVELS: u32 = 18;

/// Creates the selection layer. It holds at most one rectangle at a time.
pub fn selection_layer() -> SelectionLayer {
    let symbol = SimplePolygonSymbol::new(Color::rgba(51, 136, 255, 51))
        .with_stroke_color(Color::rgba(51, 136, 255, 255))
        .with_stroke_width(2.0);
    FeatureLayer::new(vec![], symbol, Crs::EPSG3857)
}

/// Selection tool state shared between the event handler and the UI.
#[derive(Default)]
pub struct DrawState {
    /// Whether drags are currently interpreted as rectangle drawing.
    pub armed: bool,
    /// Query for the last completed rectangle. Taken by the UI to start the
    /// statistics request.
    pub completed: Option<StatsQuery>,
    anchor: Option<Point2d>,
    feature_id: Option<FeatureId>,
}

/// Map event handler drawing the selection rectangle.
pub struct RectangleDrawHandler {
    layer: Arc<RwLock<SelectionLayer>>,
    state: Arc<RwLock<DrawState>>,
}

impl RectangleDrawHandler {
    /// Creates a handler rendering into the given layer.
    pub fn new(layer: Arc<RwLock<SelectionLayer>>, state: Arc<RwLock<DrawState>>) -> Self {
        Self { layer, state }
    }

    fn replace_rectangle(&self, corner_a: Point2d, corner_b: Point2d) {
        let mut layer = self.layer.write();
        let mut state = self.state.write();

        if let Some(id) = state.feature_id.take() {
            layer.features_mut().remove(id);
            layer.update_feature(id);
        }

        let id = layer.features_mut().add(rectangle_polygon(corner_a, corner_b));
        layer.update_feature(id);
        state.feature_id = Some(id);
    }

    fn cursor_position(map: &Map, event: &MouseEvent) -> Option<Point2d> {
        map.view().screen_to_map(event.screen_pointer_position)
    }
}

impl UserEventHandler for RectangleDrawHandler {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        if !self.state.read().armed {
            return EventPropagation::Propagate;
        }

        match event {
            UserEvent::DragStarted(button, mouse_event) if *button == MouseButton::Left => {
                let Some(position) = Self::cursor_position(map, mouse_event) else {
                    return EventPropagation::Stop;
                };

                self.state.write().anchor = Some(position);
                self.replace_rectangle(position, position);
                map.redraw();

                // Take ownership of the drag so the map does not pan.
                EventPropagation::Consume
            }
            UserEvent::Drag(button, _, mouse_event) if *button == MouseButton::Left => {
                let Some(anchor) = self.state.read().anchor else {
                    return EventPropagation::Propagate;
                };
                let Some(position) = Self::cursor_position(map, mouse_event) else {
                    return EventPropagation::Stop;
                };

                self.replace_rectangle(anchor, position);
                map.redraw();

                EventPropagation::Stop
            }
            UserEvent::DragEnded(button, mouse_event) if *button == MouseButton::Left => {
                let Some(anchor) = self.state.write().anchor.take() else {
                    return EventPropagation::Propagate;
                };
                let Some(position) = Self::cursor_position(map, mouse_event) else {
                    return EventPropagation::Stop;
                };

                self.replace_rectangle(anchor, position);
                map.redraw();

                if let Some(query) = selection_query(&anchor, &position, map.view().resolution()) {
                    let mut state = self.state.write();
                    state.completed = Some(query);
                    state.armed = false;
                }

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

fn rectangle_polygon(a: Point2d, b: Point2d) -> Polygon<Point2d> {
    Polygon::from(vec![
        Point2d::new(a.x(), a.y()),
        Point2d::new(a.x(), b.y()),
        Point2d::new(b.x(), b.y()),
        Point2d::new(b.x(), a.y()),
    ])
}

/// Converts the drawn corners into a statistics query: corners are
/// unprojected to geographic coordinates, and the integer zoom level is the
/// one whose tiles the view currently shows.
fn selection_query(
    corner_a: &Point2d,
    corner_b: &Point2d,
    resolution: f64,
) -> Option<StatsQuery> {
    let projection = Crs::EPSG3857.get_projection::<GeoPoint2d, Point2d>()?;
    let a = projection.unproject(corner_a)?;
    let b = projection.unproject(corner_b)?;
    let zoom = TileSchema::web(ZOOM_LEVELS)
        .select_lod(resolution)?
        .z_index();

    Some(StatsQuery {
        zoom,
        bbox: BoundingBox::from_corners(&a, &b),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use galileo_types::latlon;

    use super::*;

    fn projected(lat: f64, lon: f64) -> Point2d {
        Crs::EPSG3857
            .get_projection::<GeoPoint2d, Point2d>()
            .expect("projection exists for EPSG3857")
            .project(&latlon!(lat, lon))
            .expect("point is in the projection bounds")
    }

    #[test]
    fn query_covers_the_drawn_extent() {
        let resolution = TileSchema::web(ZOOM_LEVELS)
            .lod_resolution(5)
            .expect("lod 5 exists");

        let query = selection_query(&projected(48.0, 2.0), &projected(49.0, 3.0), resolution)
            .expect("corners are unprojectable");

        assert_eq!(query.zoom, 5);
        assert_relative_eq!(query.bbox.west, 2.0, epsilon = 1e-9);
        assert_relative_eq!(query.bbox.south, 48.0, epsilon = 1e-9);
        assert_relative_eq!(query.bbox.east, 3.0, epsilon = 1e-9);
        assert_relative_eq!(query.bbox.north, 49.0, epsilon = 1e-9);
    }

    #[test]
    fn query_normalizes_corners_from_any_drag_direction() {
        let resolution = TileSchema::web(ZOOM_LEVELS)
            .lod_resolution(8)
            .expect("lod 8 exists");

        let query = selection_query(&projected(49.0, 3.0), &projected(48.0, 2.0), resolution)
            .expect("corners are unprojectable");

        assert_eq!(query.zoom, 8);
        assert!(query.bbox.west < query.bbox.east);
        assert!(query.bbox.south < query.bbox.north);
    }

    #[test]
    fn rectangle_spans_both_corners() {
        let polygon = rectangle_polygon(Point2d::new(0.0, 0.0), Point2d::new(10.0, -5.0));

        let expected = Polygon::from(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(0.0, -5.0),
            Point2d::new(10.0, -5.0),
            Point2d::new(10.0, 0.0),
        ]);
        assert_eq!(polygon, expected);
    }

    #[test]
    fn state_starts_disarmed_and_empty() {
        let state = DrawState::default();
        assert!(!state.armed);
        assert!(state.completed.is_none());
    }
}
