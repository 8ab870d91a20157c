use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::RouteMapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FareZone {
    Zone(u8),
    /// Stop on the boundary of two zones, smaller zone first
    Boundary(u8, u8),
    NotZoned,
}

impl FareZone {
    /// Agency form: boundaries are written with the even zone first, "6/5"
    pub fn to_agency_string(&self) -> String {
        match self {
            FareZone::NotZoned => String::new(),
            FareZone::Zone(zone) => zone.to_string(),
            FareZone::Boundary(low, high) => {
                if low % 2 == 0 {
                    format!("{low}/{high}")
                } else {
                    format!("{high}/{low}")
                }
            }
        }
    }
}

impl FromStr for FareZone {
    type Err = RouteMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(FareZone::NotZoned);
        }

        let invalid = || RouteMapError::InvalidFareZone { raw: s.to_string() };
        let zones = s
            .split('/')
            .map(|zone| zone.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match zones[..] {
            [zone] => Ok(FareZone::Zone(zone)),
            [a, b] => Ok(FareZone::Boundary(a.min(b), a.max(b))),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for FareZone {
    type Error = RouteMapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FareZone> for String {
    fn from(value: FareZone) -> Self {
        value.to_agency_string()
    }
}

impl fmt::Display for FareZone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_agency_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fare_zone() {
        assert_eq!("".parse::<FareZone>().unwrap(), FareZone::NotZoned);
        assert_eq!("10".parse::<FareZone>().unwrap(), FareZone::Zone(10));
        assert_eq!("6/5".parse::<FareZone>().unwrap(), FareZone::Boundary(5, 6));
        assert_eq!("5/6".parse::<FareZone>().unwrap(), FareZone::Boundary(5, 6));
        assert!("a".parse::<FareZone>().is_err());
        assert!("1/2/3".parse::<FareZone>().is_err());
        assert!("1/".parse::<FareZone>().is_err());
    }

    #[test]
    fn test_fare_zone_agency_string() {
        assert_eq!(FareZone::NotZoned.to_string(), "");
        assert_eq!(FareZone::Zone(0).to_string(), "0");
        assert_eq!(FareZone::Boundary(2, 3).to_string(), "2/3");
        assert_eq!(FareZone::Boundary(3, 4).to_string(), "4/3");
    }

    #[test]
    fn test_fare_zone_serde() {
        assert_eq!(serde_json::to_string(&FareZone::Boundary(5, 6)).unwrap(), r#""6/5""#);
        assert_eq!(
            serde_json::from_str::<FareZone>(r#""12/13""#).unwrap(),
            FareZone::Boundary(12, 13)
        );
        assert!(serde_json::from_str::<FareZone>(r#""x""#).is_err());
    }
}
