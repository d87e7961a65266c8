//! ECEF to local East-North-Up conversion.
//!
//! The ENU frame is anchored at the configured reference position: its
//! geodetic representation on the WGS84 ellipsoid fixes the tangent-plane
//! basis, and every solver estimate is expressed as the rotated ECEF delta
//! from the reference. Standard deviations stay in the solver's native
//! frame and are not rotated.

use map_3d::{Ellipsoid, ecef2geodetic};

/// Local tangent-plane frame anchored at an ECEF reference position.
#[derive(Debug, Clone, Copy)]
pub struct EnuFrame {
    origin: [f64; 3],
    sin_lat: f64,
    cos_lat: f64,
    sin_lon: f64,
    cos_lon: f64,
}

impl EnuFrame {
    pub fn from_ecef(reference: [f64; 3]) -> Self {
        let (lat, lon, _height) = ecef2geodetic(
            reference[0],
            reference[1],
            reference[2],
            Ellipsoid::WGS84,
        );
        Self {
            origin: reference,
            sin_lat: lat.sin(),
            cos_lat: lat.cos(),
            sin_lon: lon.sin(),
            cos_lon: lon.cos(),
        }
    }

    /// Convert one ECEF position into ENU meters relative to the origin.
    pub fn to_enu(&self, ecef: [f64; 3]) -> [f64; 3] {
        let dx = ecef[0] - self.origin[0];
        let dy = ecef[1] - self.origin[1];
        let dz = ecef[2] - self.origin[2];

        let east = -self.sin_lon * dx + self.cos_lon * dy;
        let north =
            -self.sin_lat * self.cos_lon * dx - self.sin_lat * self.sin_lon * dy + self.cos_lat * dz;
        let up =
            self.cos_lat * self.cos_lon * dx + self.cos_lat * self.sin_lon * dy + self.sin_lat * dz;

        [east, north, up]
    }
}
