use std::fmt;

use crate::error::CoverageError;

/// A coordinate reference system identified by its EPSG code.
///
/// Only codes with a PROJ.4 definition in the EPSG registry can be
/// constructed, so every `Crs` value is reprojectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// EPSG:3031, Antarctic Polar Stereographic (WGS84, true scale at 71°S).
    pub const ANTARCTIC_POLAR_STEREOGRAPHIC: Self = Self { epsg: 3031 };

    /// EPSG:4326, WGS84 longitude/latitude in degrees.
    pub const WGS84: Self = Self { epsg: 4326 };

    /// Construct from an EPSG code, rejecting codes the registry does not define.
    pub fn from_epsg(epsg: u32) -> Result<Self, CoverageError> {
        match proj4_definition(epsg) {
            Some(_) => Ok(Self { epsg }),
            None => Err(CoverageError::UnknownCrs(epsg)),
        }
    }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Geographic systems take and return degrees; projected ones metres.
    pub fn is_geographic(&self) -> bool {
        let definition = self.proj4();
        definition.contains("+proj=longlat") || definition.contains("+proj=latlong")
    }

    /// PROJ.4 definition string for this system.
    pub(crate) fn proj4(&self) -> &'static str {
        // Construction guarantees the lookup succeeds.
        proj4_definition(self.epsg).unwrap_or(WGS84_LONGLAT)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Registry lookup. EPSG codes fit in 16 bits; anything larger is not an EPSG code.
fn proj4_definition(epsg: u32) -> Option<&'static str> {
    let code = u16::try_from(epsg).ok()?;
    crs_definitions::from_code(code).map(|def| def.proj4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_construct() {
        assert_eq!(Crs::from_epsg(3031).unwrap(), Crs::ANTARCTIC_POLAR_STEREOGRAPHIC);
        assert_eq!(Crs::from_epsg(32721).unwrap().epsg(), 32721);
        assert!(Crs::from_epsg(32721).unwrap().proj4().contains("+south"));
    }

    #[test]
    fn polar_systems_beyond_the_common_ones_construct() {
        for code in [32761, 3976, 3413] {
            assert_eq!(Crs::from_epsg(code).unwrap().epsg(), code);
        }
        assert!(Crs::from_epsg(32761).unwrap().proj4().contains("+proj=stere"));
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(Crs::from_epsg(1), Err(CoverageError::UnknownCrs(1))));
        assert!(matches!(Crs::from_epsg(102021), Err(CoverageError::UnknownCrs(102021))));
    }

    #[test]
    fn displays_as_authority_code() {
        assert_eq!(Crs::ANTARCTIC_POLAR_STEREOGRAPHIC.to_string(), "EPSG:3031");
        assert!(Crs::WGS84.is_geographic());
        assert!(!Crs::ANTARCTIC_POLAR_STEREOGRAPHIC.is_geographic());
        assert!(!Crs::from_epsg(32761).unwrap().is_geographic());
    }
}
