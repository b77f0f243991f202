//! Small closed tags passed through the public lookup API.

use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Which side of a mortar interface a constraint views it from.
///
/// The two views of one interface key different synthetic boundaries:
/// the master view searches the master boundary against nodes tagged
/// `MORTAR_OFFSET + slave`, the slave view searches the slave boundary
/// against nodes tagged `MORTAR_OFFSET + master`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintSide {
    /// Master-side view of the interface.
    Master,
    /// Slave-side view of the interface.
    Slave,
}

impl fmt::Display for ConstraintSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Slave => write!(f, "slave"),
        }
    }
}

impl FromStr for ConstraintSide {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "master" | "primary" => Ok(Self::Master),
            "slave" | "secondary" => Ok(Self::Slave),
            _ => Err(SearchError::UnknownSideType { tag: s.to_string() }),
        }
    }
}

impl TryFrom<u8> for ConstraintSide {
    type Error = SearchError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Master),
            1 => Ok(Self::Slave),
            _ => Err(SearchError::UnknownSideType { tag: v.to_string() }),
        }
    }
}

/// Polynomial order of a quadrature rule or surface interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Order {
    /// Exact for linear integrands.
    First,
    /// Exact for quadratics.
    Second,
    /// Exact for cubics.
    Third,
    /// Exact for quartics.
    Fourth,
    /// Exact for quintics.
    Fifth,
}

impl Order {
    /// Polynomial degree as an integer.
    pub fn degree(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Fifth => 5,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::First => "FIRST",
            Self::Second => "SECOND",
            Self::Third => "THIRD",
            Self::Fourth => "FOURTH",
            Self::Fifth => "FIFTH",
        };
        f.write_str(name)
    }
}

impl FromStr for Order {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIRST" | "1" => Ok(Self::First),
            "SECOND" | "2" => Ok(Self::Second),
            "THIRD" | "3" => Ok(Self::Third),
            "FOURTH" | "4" => Ok(Self::Fourth),
            "FIFTH" | "5" => Ok(Self::Fifth),
            _ => Err(SearchError::UnknownOrder { tag: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_both_spellings() {
        assert_eq!("Master".parse::<ConstraintSide>().unwrap(), ConstraintSide::Master);
        assert_eq!("secondary".parse::<ConstraintSide>().unwrap(), ConstraintSide::Slave);
        assert_eq!(ConstraintSide::try_from(1u8).unwrap(), ConstraintSide::Slave);
    }

    #[test]
    fn unknown_side_is_fatal() {
        match "lagrange".parse::<ConstraintSide>() {
            Err(SearchError::UnknownSideType { tag }) => assert_eq!(tag, "lagrange"),
            other => panic!("expected UnknownSideType, got {other:?}"),
        }
        assert!(matches!(
            ConstraintSide::try_from(2u8),
            Err(SearchError::UnknownSideType { .. })
        ));
    }

    #[test]
    fn order_round_trips_through_display() {
        for order in [Order::First, Order::Second, Order::Third, Order::Fourth, Order::Fifth] {
            assert_eq!(order.to_string().parse::<Order>().unwrap(), order);
        }
        assert_eq!(Order::Third.degree(), 3);
        assert!("SIXTH".parse::<Order>().is_err());
    }
}
