//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.
//! Les coordonnées sont toujours traitées dans l'ordre x,y (longitude, latitude).

#[cfg(feature = "reproject")]
use anyhow::{Context, Result};
#[cfg(feature = "reproject")]
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
#[cfg(feature = "reproject")]
use proj::Proj;

/// Reprojection de géométries entre deux systèmes de coordonnées
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Option<Proj>,
    source_epsg: u32,
    target_epsg: u32,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    ///
    /// `Proj::new_known_crs` normalise l'ordre des axes pour la visualisation (x,y).
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self {
                proj: None,
                source_epsg,
                target_epsg,
            });
        }

        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).context(format!(
            "Failed to create projection from {} to {}",
            source, target
        ))?;

        Ok(Self {
            proj: Some(proj),
            source_epsg,
            target_epsg,
        })
    }

    /// Retourne le SRID source
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Retourne le SRID cible
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        let Some(proj) = &self.proj else {
            return Ok(geom.clone());
        };

        match geom {
            Geometry::Point(p) => {
                let (x, y) = transform_coord(proj, p.0)?;
                Ok(Geometry::Point(Point::new(x, y)))
            }
            Geometry::Line(l) => {
                let ls = LineString::new(vec![l.start, l.end]);
                Ok(Geometry::LineString(transform_linestring(proj, &ls)?))
            }
            Geometry::LineString(ls) => {
                let transformed = transform_linestring(proj, ls)?;
                Ok(Geometry::LineString(transformed))
            }
            Geometry::Polygon(p) => {
                let transformed = transform_polygon(proj, p)?;
                Ok(Geometry::Polygon(transformed))
            }
            Geometry::Rect(r) => Ok(Geometry::Polygon(transform_polygon(proj, &r.to_polygon())?)),
            Geometry::Triangle(t) => {
                Ok(Geometry::Polygon(transform_polygon(proj, &t.to_polygon())?))
            }
            Geometry::MultiPoint(mp) => {
                let points: Result<Vec<Point>> =
                    mp.0.iter()
                        .map(|p| {
                            let (x, y) = transform_coord(proj, p.0)?;
                            Ok(Point::new(x, y))
                        })
                        .collect();
                Ok(Geometry::MultiPoint(MultiPoint::new(points?)))
            }
            Geometry::MultiLineString(mls) => {
                let lines: Result<Vec<LineString>> = mls
                    .0
                    .iter()
                    .map(|ls| transform_linestring(proj, ls))
                    .collect();
                Ok(Geometry::MultiLineString(MultiLineString::new(lines?)))
            }
            Geometry::MultiPolygon(mp) => {
                let polys: Result<Vec<Polygon>> =
                    mp.0.iter().map(|p| transform_polygon(proj, p)).collect();
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polys?)))
            }
            Geometry::GeometryCollection(gc) => {
                let geoms: Result<Vec<Geometry>> =
                    gc.0.iter().map(|g| self.transform_geometry(g)).collect();
                Ok(Geometry::GeometryCollection(GeometryCollection::new_from(
                    geoms?,
                )))
            }
        }
    }
}

/// Transforme une coordonnée unique
#[cfg(feature = "reproject")]
fn transform_coord(proj: &Proj, coord: Coord) -> Result<(f64, f64)> {
    proj.convert((coord.x, coord.y))
        .context("Coordinate transformation failed")
}

/// Transforme une LineString (batch conversion)
#[cfg(feature = "reproject")]
fn transform_linestring(proj: &Proj, ls: &LineString) -> Result<LineString> {
    let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

    proj.convert_array(&mut coords)
        .context("Batch coordinate transformation failed")?;

    let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
    Ok(LineString::new(result))
}

/// Transforme un Polygon
#[cfg(feature = "reproject")]
fn transform_polygon(proj: &Proj, p: &Polygon) -> Result<Polygon> {
    let exterior = transform_linestring(proj, p.exterior())?;
    let interiors: Result<Vec<LineString>> = p
        .interiors()
        .iter()
        .map(|ls| transform_linestring(proj, ls))
        .collect();
    Ok(Polygon::new(exterior, interiors?))
}

#[cfg(feature = "reproject")]
#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Point};

    #[test]
    fn test_wgs84_to_utm20n() {
        // Halifax (environ): lon=-63.57, lat=44.65
        // NAD83(CSRS) / UTM 20N: X≈454800, Y≈4944500
        let reprojector = Reprojector::new(4326, 2961).unwrap();

        let halifax = Geometry::Point(Point::new(-63.57, 44.65));
        let utm = reprojector.transform_geometry(&halifax).unwrap();

        if let Geometry::Point(p) = utm {
            assert!(
                p.x() > 400_000.0 && p.x() < 500_000.0,
                "Easting should be around 454800, got {}",
                p.x()
            );
            assert!(
                p.y() > 4_900_000.0 && p.y() < 5_000_000.0,
                "Northing should be around 4944500, got {}",
                p.y()
            );
        } else {
            panic!("Expected Point geometry");
        }
    }

    #[test]
    fn test_identity_transform() {
        let reprojector = Reprojector::new(2961, 2961).unwrap();

        let point = Geometry::Point(Point::new(454_800.0, 4_944_500.0));
        let result = reprojector.transform_geometry(&point).unwrap();

        if let Geometry::Point(p) = result {
            assert!((p.x() - 454_800.0).abs() < 0.0001);
            assert!((p.y() - 4_944_500.0).abs() < 0.0001);
        } else {
            panic!("Expected Point geometry");
        }
    }

    #[test]
    fn test_multilinestring_transform() {
        let reprojector = Reprojector::new(4326, 2961).unwrap();

        let route = Geometry::MultiLineString(MultiLineString::new(vec![
            line_string![(x: -63.57, y: 44.64), (x: -63.58, y: 44.65), (x: -63.59, y: 44.66)],
            line_string![(x: -63.60, y: 44.67), (x: -63.61, y: 44.68)],
        ]));

        let result = reprojector.transform_geometry(&route).unwrap();

        if let Geometry::MultiLineString(mls) = result {
            assert_eq!(mls.0.len(), 2);
            assert_eq!(mls.0[0].0.len(), 3);
            assert_eq!(mls.0[1].0.len(), 2);
            let first = &mls.0[0].0[0];
            assert!(first.x > 400_000.0 && first.x < 500_000.0);
        } else {
            panic!("Expected MultiLineString geometry");
        }
    }

    #[test]
    fn test_invalid_epsg() {
        let result = Reprojector::new(99999, 2961);
        assert!(result.is_err());
    }
}

#[cfg(not(feature = "reproject"))]
use anyhow::{ensure, Result};
#[cfg(not(feature = "reproject"))]
use geo::Geometry;

/// Reprojector compilé sans PROJ: seul le cas source = cible est accepté
#[cfg(not(feature = "reproject"))]
pub struct Reprojector {
    epsg: u32,
}

#[cfg(not(feature = "reproject"))]
impl Reprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        ensure!(
            source_epsg == target_epsg,
            "Cannot reproject transit dataset from EPSG:{} to EPSG:{}: \
             transit-load was built without PROJ (enable the `reproject` feature)",
            source_epsg,
            target_epsg
        );
        Ok(Self { epsg: target_epsg })
    }

    pub fn source_epsg(&self) -> u32 {
        self.epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.epsg
    }

    /// Source et cible identiques: géométrie inchangée
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        Ok(geom.clone())
    }
}
