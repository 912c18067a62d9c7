use crate::foundation::core::Point;
use crate::foundation::error::{TourError, TourResult};

const EARTH_RADIUS_M: f64 = 6_378_137.0;
// Web Mercator is undefined at the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Coordinate system of tour geometry, identified by its well-known id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SpatialReference {
    /// Well-known id (4326, 3857 or 102100).
    pub wkid: u32,
}

impl SpatialReference {
    /// Geographic longitude/latitude in degrees.
    pub const WGS84: Self = Self { wkid: 4326 };
    /// Spherical Web Mercator in metres.
    pub const WEB_MERCATOR: Self = Self { wkid: 3857 };

    /// Validate a well-known id.
    pub fn new(wkid: u32) -> TourResult<Self> {
        let sr = Self { wkid };
        sr.validate()?;
        Ok(sr)
    }

    /// Reject references that cannot be projected to longitude/latitude.
    pub fn validate(self) -> TourResult<()> {
        if self.is_geographic() || self.is_web_mercator() {
            Ok(())
        } else {
            Err(TourError::configuration(format!(
                "unsupported spatial reference wkid {}",
                self.wkid
            )))
        }
    }

    /// `true` for longitude/latitude degrees.
    pub fn is_geographic(self) -> bool {
        self.wkid == 4326
    }

    /// `true` for either Web Mercator id.
    pub fn is_web_mercator(self) -> bool {
        matches!(self.wkid, 3857 | 102100)
    }

    /// `true` when both ids describe the same coordinate system.
    pub fn equivalent(self, other: Self) -> bool {
        self.wkid == other.wkid || (self.is_web_mercator() && other.is_web_mercator())
    }

    /// Convert a point in this reference to longitude/latitude degrees.
    pub fn to_lon_lat(self, p: Point) -> Point {
        if self.is_web_mercator() {
            let lon = (p.x / EARTH_RADIUS_M).to_degrees();
            let lat = (2.0 * (p.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
                .to_degrees();
            Point::new(lon, lat)
        } else {
            p
        }
    }

    /// Convert longitude/latitude degrees into this reference.
    pub fn from_lon_lat(self, p: Point) -> Point {
        if self.is_web_mercator() {
            let lat = p.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
            let x = EARTH_RADIUS_M * p.x.to_radians();
            let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
            Point::new(x, y)
        } else {
            p
        }
    }

    /// Reproject a point from this reference into `target`.
    pub fn project_to(self, p: Point, target: Self) -> Point {
        if self.equivalent(target) {
            return p;
        }
        target.from_lon_lat(self.to_lon_lat(p))
    }
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self::WEB_MERCATOR
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/spatial.rs"]
mod tests;
