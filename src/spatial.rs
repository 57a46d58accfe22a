//! Spatial utilities leveraging the geo crate.
//!
//! This module wraps the handful of geometry operations the statistics
//! engine and the discovery workflow need: bounding boxes, boundary-inclusive
//! containment, regular grid sampling inside a polygon, and a reprojection
//! seam. Coordinate-system math itself is a collaborator concern; the seam
//! only applies a caller-supplied transform to every coordinate.

use geo::{BoundingRect, Coord, Intersects, MapCoords, Point, Rect};

use crate::error::{PanostatError, Result};

/// Create a bounding box from min/max coordinates.
///
/// # Errors
///
/// Returns an error if min > max for either axis.
///
/// # Examples
///
/// ```rust
/// use panostat::spatial::bounding_box;
///
/// // Amsterdam city center
/// let bbox = bounding_box(4.88, 52.36, 4.92, 52.38).unwrap();
/// assert!(bounding_box(4.92, 52.36, 4.88, 52.38).is_err());
/// ```
pub fn bounding_box(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Rect> {
    if min_x > max_x {
        return Err(PanostatError::InvalidInput(format!(
            "min_x ({}) must be <= max_x ({})",
            min_x, max_x
        )));
    }
    if min_y > max_y {
        return Err(PanostatError::InvalidInput(format!(
            "min_y ({}) must be <= max_y ({})",
            min_y, max_y
        )));
    }

    Ok(Rect::new(
        geo::coord! { x: min_x, y: min_y },
        geo::coord! { x: max_x, y: max_y },
    ))
}

/// Check whether a point falls inside a bounding box, boundary inclusive.
pub fn point_in_bbox(bbox: &Rect, point: &Point) -> bool {
    bbox.intersects(point)
}

/// Boundary-inclusive point-in-polygon test.
///
/// Uses intersection rather than strict interior containment so that a point
/// sitting exactly on the polygon edge counts as inside, matching the
/// membership rule the polygon aggregator applies.
///
/// # Examples
///
/// ```rust
/// use geo::{polygon, Point};
/// use panostat::spatial::point_in_polygon;
///
/// let poly = polygon![
///     (x: 0.0, y: 0.0),
///     (x: 1.0, y: 0.0),
///     (x: 1.0, y: 1.0),
///     (x: 0.0, y: 1.0),
/// ];
///
/// assert!(point_in_polygon(&poly, &Point::new(0.5, 0.5)));
/// assert!(point_in_polygon(&poly, &Point::new(1.0, 0.5))); // on the edge
/// assert!(!point_in_polygon(&poly, &Point::new(1.5, 0.5)));
/// ```
pub fn point_in_polygon<G: Intersects<Point>>(geometry: &G, point: &Point) -> bool {
    geometry.intersects(point)
}

/// Sample a regular grid of points inside a geometry.
///
/// Lays a grid with `resolution` spacing over the geometry's bounding box,
/// starting at the floored minimum corner, and keeps the points that fall
/// inside the geometry (boundary inclusive). The geometry should be in a
/// projected coordinate system whose unit matches the resolution — meters
/// for any sensible choice; reproject the sampled points afterwards with
/// [`reproject`] if queries must be made in geographic coordinates.
///
/// # Errors
///
/// Returns an error if `resolution` is not positive and finite.
pub fn sample_grid<G>(geometry: &G, resolution: f64) -> Result<Vec<Point>>
where
    G: BoundingRect<f64> + Intersects<Point>,
{
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(PanostatError::InvalidInput(format!(
            "grid resolution must be positive and finite, got {}",
            resolution
        )));
    }

    let Some(bounds) = geometry.bounding_rect().into() else {
        return Ok(Vec::new());
    };

    let (x_end, y_end) = (bounds.max().x.ceil(), bounds.max().y.ceil());
    let mut points = Vec::new();

    let mut x = bounds.min().x.floor();
    while x < x_end {
        let mut y = bounds.min().y.floor();
        while y < y_end {
            let candidate = Point::new(x, y);
            if geometry.intersects(&candidate) {
                points.push(candidate);
            }
            y += resolution;
        }
        x += resolution;
    }

    Ok(points)
}

/// Apply a coordinate transform to every coordinate of a geometry.
///
/// This is the seam a CRS transformer plugs into: the caller supplies the
/// projection math (a closure over `Coord`), and any geo geometry comes back
/// with all coordinates mapped.
///
/// # Examples
///
/// ```rust
/// use geo::{polygon, Coord};
/// use panostat::spatial::reproject;
///
/// let poly = polygon![
///     (x: 0.0, y: 0.0),
///     (x: 1000.0, y: 0.0),
///     (x: 1000.0, y: 1000.0),
/// ];
///
/// // A toy "projection": kilometers to meters.
/// let scaled = reproject(&poly, |c: Coord| Coord { x: c.x / 1000.0, y: c.y / 1000.0 });
/// assert_eq!(scaled.exterior().0[1], Coord { x: 1.0, y: 0.0 });
/// ```
pub fn reproject<G>(geometry: &G, transform: impl Fn(Coord) -> Coord + Copy) -> G::Output
where
    G: MapCoords<f64, f64>,
{
    geometry.map_coords(transform)
}
