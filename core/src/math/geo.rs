/// Kilometers spanned by one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Latitude/longitude extrema of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat, lon) = iter.next()?;
        let init = Self {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        };
        Some(iter.fold(init, |b, (lat, lon)| Self {
            min_lat: b.min_lat.min(lat),
            max_lat: b.max_lat.max(lat),
            min_lon: b.min_lon.min(lon),
            max_lon: b.max_lon.max(lon),
        }))
    }

    pub fn mid_latitude(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }

    pub fn height_km(&self) -> f64 {
        (self.max_lat - self.min_lat) * KM_PER_DEGREE
    }

    /// East-west extent scaled by the cosine of the mid latitude.
    pub fn width_km(&self) -> f64 {
        (self.max_lon - self.min_lon) * KM_PER_DEGREE * self.mid_latitude().to_radians().cos()
    }

    /// Equirectangular area; only meaningful for compact survey areas.
    pub fn area_km2(&self) -> f64 {
        self.width_km() * self.height_km()
    }
}
