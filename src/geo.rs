//! Geographic points and bounding-coordinate derivation.
//!
//! This module implements the geometric core: great-circle distance via the
//! spherical law of cosines and derivation of a bounding box guaranteed to
//! contain a circular search radius around a center point.
//!
//! The Earth is modeled as a sphere. This is a stated approximation, not an
//! attempt at WGS84 accuracy: the error is well under 0.5% for the search
//! radii this crate is used with.

use crate::error::{Result, SightlineError};
use serde::{Deserialize, Serialize};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.01;
/// Earth's mean radius in statute miles.
pub const EARTH_RADIUS_MI: f64 = 3958.762079;

const MI2KM: f64 = 1.6093439999999999;
const KM2MI: f64 = 0.621371192237334;

const MAX_LAT_RAD: f64 = std::f64::consts::FRAC_PI_2;
const MIN_LAT_RAD: f64 = -MAX_LAT_RAD;
const MAX_LON_RAD: f64 = std::f64::consts::PI;
const MIN_LON_RAD: f64 = -MAX_LON_RAD;
const FULL_CIRCLE_RAD: f64 = std::f64::consts::PI * 2.0;

/// Unit used for distances and search radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    /// Kilometers (default).
    #[default]
    Kilometers,
    /// Statute miles.
    Miles,
}

impl DistanceUnit {
    /// Earth's mean radius expressed in this unit.
    pub fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
            DistanceUnit::Miles => EARTH_RADIUS_MI,
        }
    }
}

/// Convert an angle in degrees to radians.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidArgument`] if the value is not finite.
pub fn degrees_to_radians(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SightlineError::InvalidArgument(format!(
            "degree value must be finite, got: {}",
            value
        )));
    }
    Ok(value.to_radians())
}

/// Convert an angle in radians to degrees.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidArgument`] if the value is not finite.
pub fn radians_to_degrees(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SightlineError::InvalidArgument(format!(
            "radian value must be finite, got: {}",
            value
        )));
    }
    Ok(value.to_degrees())
}

/// Convert statute miles to kilometers.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidArgument`] if the value is not finite.
pub fn miles_to_kilometers(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SightlineError::InvalidArgument(format!(
            "mile value must be finite, got: {}",
            value
        )));
    }
    Ok(value * MI2KM)
}

/// Convert kilometers to statute miles.
///
/// # Errors
///
/// Returns [`SightlineError::InvalidArgument`] if the value is not finite.
pub fn kilometers_to_miles(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SightlineError::InvalidArgument(format!(
            "kilometer value must be finite, got: {}",
            value
        )));
    }
    Ok(value * KM2MI)
}

/// An immutable point on the surface of the Earth.
///
/// Both degree and radian forms of each coordinate are computed once at
/// construction and cached, so later reads never re-convert. Construction
/// validates ranges; every `GeoPoint` in existence is a valid coordinate.
///
/// # Examples
///
/// ```
/// use sightline::GeoPoint;
///
/// let buenos_aires = GeoPoint::from_degrees(-34.574, -58.459)?;
/// assert_eq!(buenos_aires.lat(), -34.574);
/// assert_eq!(buenos_aires.lon(), -58.459);
/// # Ok::<(), sightline::SightlineError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    deg_lat: f64,
    deg_lon: f64,
    rad_lat: f64,
    rad_lon: f64,
}

impl GeoPoint {
    /// Create a point from a latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidCoordinate`] when either value is
    /// non-finite, latitude is outside [-90, 90], or longitude is outside
    /// [-180, 180].
    pub fn from_degrees(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() {
            return Err(SightlineError::InvalidCoordinate(format!(
                "latitude must be finite, got: {}",
                lat
            )));
        }
        if !lon.is_finite() {
            return Err(SightlineError::InvalidCoordinate(format!(
                "longitude must be finite, got: {}",
                lon
            )));
        }
        let point = Self {
            deg_lat: lat,
            deg_lon: lon,
            rad_lat: lat.to_radians(),
            rad_lon: lon.to_radians(),
        };
        point.validate()
    }

    /// Create a point from a latitude and longitude in radians.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidCoordinate`] when either value is
    /// non-finite or outside [-π/2, π/2] / [-π, π].
    pub fn from_radians(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() {
            return Err(SightlineError::InvalidCoordinate(format!(
                "latitude must be finite, got: {}",
                lat
            )));
        }
        if !lon.is_finite() {
            return Err(SightlineError::InvalidCoordinate(format!(
                "longitude must be finite, got: {}",
                lon
            )));
        }
        let point = Self {
            deg_lat: lat.to_degrees(),
            deg_lon: lon.to_degrees(),
            rad_lat: lat,
            rad_lon: lon,
        };
        point.validate()
    }

    /// Parse a point from a `"lat,lon"` decimal pair, as found in the `ll=`
    /// query parameter of map links.
    ///
    /// # Examples
    ///
    /// ```
    /// use sightline::GeoPoint;
    ///
    /// let point = GeoPoint::from_latlon_str("-34.574,-58.459")?;
    /// assert_eq!(point.lat(), -34.574);
    /// # Ok::<(), sightline::SightlineError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidCoordinate`] when the text is not a
    /// comma-separated pair of decimals, or the parsed values are out of
    /// range.
    pub fn from_latlon_str(text: &str) -> Result<Self> {
        let (lat_str, lon_str) = text.split_once(',').ok_or_else(|| {
            SightlineError::InvalidCoordinate(format!(
                "expected 'lat,lon' pair, got: '{}'",
                text
            ))
        })?;
        let lat: f64 = lat_str.trim().parse().map_err(|_| {
            SightlineError::InvalidCoordinate(format!("unparsable latitude: '{}'", lat_str))
        })?;
        let lon: f64 = lon_str.trim().parse().map_err(|_| {
            SightlineError::InvalidCoordinate(format!("unparsable longitude: '{}'", lon_str))
        })?;
        Self::from_degrees(lat, lon)
    }

    fn validate(self) -> Result<Self> {
        if self.rad_lat < MIN_LAT_RAD || self.rad_lat > MAX_LAT_RAD {
            return Err(SightlineError::InvalidCoordinate(format!(
                "latitude out of range [-90, 90]: {}",
                self.deg_lat
            )));
        }
        if self.rad_lon < MIN_LON_RAD || self.rad_lon > MAX_LON_RAD {
            return Err(SightlineError::InvalidCoordinate(format!(
                "longitude out of range [-180, 180]: {}",
                self.deg_lon
            )));
        }
        Ok(self)
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.deg_lat
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.deg_lon
    }

    /// Latitude in radians.
    #[inline]
    pub fn lat_rad(&self) -> f64 {
        self.rad_lat
    }

    /// Longitude in radians.
    #[inline]
    pub fn lon_rad(&self) -> f64 {
        self.rad_lon
    }

    /// Great-circle distance to another point, in the requested unit.
    ///
    /// Uses the spherical law of cosines. The arccos argument is clamped to
    /// [-1, 1]: for identical or antipodal points floating-point drift can
    /// push it slightly outside, which would otherwise yield NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use sightline::{DistanceUnit, GeoPoint};
    ///
    /// let nyc = GeoPoint::from_degrees(40.7128, -74.0060)?;
    /// let la = GeoPoint::from_degrees(34.0522, -118.2437)?;
    /// let km = nyc.distance_to(&la, DistanceUnit::Kilometers);
    /// assert!(km > 3_900.0 && km < 4_000.0);
    /// # Ok::<(), sightline::SightlineError>(())
    /// ```
    pub fn distance_to(&self, other: &GeoPoint, unit: DistanceUnit) -> f64 {
        let (lat1, lon1) = (self.rad_lat, self.rad_lon);
        let (lat2, lon2) = (other.rad_lat, other.rad_lon);
        let cos_arg = (lat1.sin() * lat2.sin()
            + lat1.cos() * lat2.cos() * (lon1 - lon2).cos())
        .clamp(-1.0, 1.0);
        cos_arg.acos() * unit.earth_radius()
    }

    /// Bounding box containing every point within `radius` of this point,
    /// using Earth's mean radius for the given unit.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidArgument`] when the radius is not a
    /// positive finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// use sightline::{DistanceUnit, GeoPoint};
    ///
    /// let center = GeoPoint::from_degrees(0.0, 0.0)?;
    /// let bbox = center.bounding_coordinates(111.19, DistanceUnit::Kilometers)?;
    /// assert!((bbox.sw().lat() + 1.0).abs() < 0.01);
    /// assert!((bbox.ne().lat() - 1.0).abs() < 0.01);
    /// # Ok::<(), sightline::SightlineError>(())
    /// ```
    pub fn bounding_coordinates(&self, radius: f64, unit: DistanceUnit) -> Result<BoundingBox> {
        self.bounding_coordinates_on_sphere(radius, unit.earth_radius())
    }

    /// Bounding box for `radius` on a sphere of the given radius, both in
    /// the same unit. Callers working with non-standard spheres (or wanting
    /// an explicit Earth-radius override) use this form directly.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidArgument`] when the search radius or
    /// the sphere radius is not a positive finite number.
    pub fn bounding_coordinates_on_sphere(
        &self,
        radius: f64,
        sphere_radius: f64,
    ) -> Result<BoundingBox> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SightlineError::InvalidArgument(format!(
                "search radius must be a positive finite number, got: {}",
                radius
            )));
        }
        if !sphere_radius.is_finite() || sphere_radius <= 0.0 {
            return Err(SightlineError::InvalidArgument(format!(
                "sphere radius must be a positive finite number, got: {}",
                sphere_radius
            )));
        }

        // Angular radius of the search circle.
        let rad_dist = radius / sphere_radius;
        let mut min_lat = self.rad_lat - rad_dist;
        let mut max_lat = self.rad_lat + rad_dist;

        let (min_lon, max_lon) = if min_lat > MIN_LAT_RAD && max_lat < MAX_LAT_RAD {
            // The circle does not reach a pole. The extreme longitudes of
            // the circle are NOT at the center latitude; asin accounts for
            // the meridian convergence.
            let delta_lon = (rad_dist.sin() / self.rad_lat.cos()).asin();
            let mut min_lon = self.rad_lon - delta_lon;
            if min_lon < MIN_LON_RAD {
                min_lon += FULL_CIRCLE_RAD;
            }
            let mut max_lon = self.rad_lon + delta_lon;
            if max_lon > MAX_LON_RAD {
                max_lon -= FULL_CIRCLE_RAD;
            }
            (min_lon, max_lon)
        } else {
            // The circle spans a pole: every longitude is inside it, so the
            // box degenerates to a full latitude band.
            min_lat = min_lat.max(MIN_LAT_RAD);
            max_lat = max_lat.min(MAX_LAT_RAD);
            (MIN_LON_RAD, MAX_LON_RAD)
        };

        Ok(BoundingBox {
            sw: GeoPoint::from_radians(min_lat, min_lon)?,
            ne: GeoPoint::from_radians(max_lat, max_lon)?,
        })
    }
}

impl TryFrom<geo::Point<f64>> for GeoPoint {
    type Error = SightlineError;

    /// Convert from a `geo::Point`, which stores (x, y) = (lon, lat) in
    /// degrees.
    fn try_from(point: geo::Point<f64>) -> Result<Self> {
        GeoPoint::from_degrees(point.y(), point.x())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lon(), point.lat())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.deg_lat, self.deg_lon)
    }
}

/// Rectangular lat/lon region defined by its south-west and north-east
/// corners, derived per query and guaranteed to contain the generating
/// search circle.
///
/// A box that straddles the antimeridian has `sw().lon() > ne().lon()`;
/// [`BoundingBox::contains`] handles that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    sw: GeoPoint,
    ne: GeoPoint,
}

impl BoundingBox {
    /// Build a box directly from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`SightlineError::InvalidArgument`] when the south-west
    /// latitude exceeds the north-east latitude.
    pub fn new(sw: GeoPoint, ne: GeoPoint) -> Result<Self> {
        if sw.lat() > ne.lat() {
            return Err(SightlineError::InvalidArgument(format!(
                "south-west latitude ({}) must be <= north-east latitude ({})",
                sw.lat(),
                ne.lat()
            )));
        }
        Ok(Self { sw, ne })
    }

    /// South-west corner.
    #[inline]
    pub fn sw(&self) -> &GeoPoint {
        &self.sw
    }

    /// North-east corner.
    #[inline]
    pub fn ne(&self) -> &GeoPoint {
        &self.ne
    }

    /// True when the box crosses the 180°/-180° longitude boundary.
    #[inline]
    pub fn wraps_antimeridian(&self) -> bool {
        self.sw.lon() > self.ne.lon()
    }

    /// Whether a point lies inside or on the box.
    ///
    /// # Examples
    ///
    /// ```
    /// use sightline::{DistanceUnit, GeoPoint};
    ///
    /// let center = GeoPoint::from_degrees(0.0, 179.9)?;
    /// let bbox = center.bounding_coordinates(100.0, DistanceUnit::Kilometers)?;
    /// assert!(bbox.wraps_antimeridian());
    /// assert!(bbox.contains(&GeoPoint::from_degrees(0.0, -179.8)?));
    /// # Ok::<(), sightline::SightlineError>(())
    /// ```
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat_ok = point.lat() >= self.sw.lat() && point.lat() <= self.ne.lat();
        let lon_ok = if self.wraps_antimeridian() {
            point.lon() >= self.sw.lon() || point.lon() <= self.ne.lon()
        } else {
            point.lon() >= self.sw.lon() && point.lon() <= self.ne.lon()
        };
        lat_ok && lon_ok
    }
}

impl std::fmt::Display for BoundingBox {
    /// Renders the comma-joined literal used by bounding-box query
    /// protocols: `swLat,swLon,neLat,neLon`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.sw.lat(),
            self.sw.lon(),
            self.ne.lat(),
            self.ne.lon()
        )
    }
}
