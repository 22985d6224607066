use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockbook_core::DomainError;

/// Why stock moved. Closed set; the wire values are a stable contract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    Produksi,
    Penjualan,
    Retur,
    TransferIn,
    TransferOut,
    Waste,
    Penyesuaian,
}

impl Reason {
    pub const ALL: [Reason; 7] = [
        Reason::Produksi,
        Reason::Penjualan,
        Reason::Retur,
        Reason::TransferIn,
        Reason::TransferOut,
        Reason::Waste,
        Reason::Penyesuaian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Produksi => "PRODUKSI",
            Reason::Penjualan => "PENJUALAN",
            Reason::Retur => "RETUR",
            Reason::TransferIn => "TRANSFER_IN",
            Reason::TransferOut => "TRANSFER_OUT",
            Reason::Waste => "WASTE",
            Reason::Penyesuaian => "PENYESUAIAN",
        }
    }

    /// Reasons reserved for the twin entries written by the transfer engine.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Reason::TransferIn | Reason::TransferOut)
    }
}

impl core::fmt::Display for Reason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reason::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "reason must be one of: PRODUKSI, PENJUALAN, RETUR, TRANSFER_IN, TRANSFER_OUT, WASTE, PENYESUAIAN (got '{s}')"
                ))
            })
    }
}

/// Direction of a manual mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }

    /// Apply the direction's sign to a positive magnitude.
    pub fn sign(&self, qty: i64) -> i64 {
        match self {
            Direction::In => qty,
            Direction::Out => -qty,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            other => Err(DomainError::validation(format!(
                "direction must be IN or OUT (got '{other}')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_the_published_enumeration() {
        let wire: Vec<String> = Reason::ALL
            .iter()
            .map(|r| serde_json::to_value(r).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            wire,
            vec![
                "PRODUKSI",
                "PENJUALAN",
                "RETUR",
                "TRANSFER_IN",
                "TRANSFER_OUT",
                "WASTE",
                "PENYESUAIAN"
            ]
        );
        for r in Reason::ALL {
            assert_eq!(r.as_str().parse::<Reason>().unwrap(), r);
        }
    }

    #[test]
    fn unknown_reason_fails_at_parse_time() {
        assert!(matches!("SHRINKAGE".parse::<Reason>(), Err(DomainError::Validation(_))));
        assert!(serde_json::from_str::<Reason>("\"produksi\"").is_err());
    }

    #[test]
    fn direction_signs_quantity() {
        assert_eq!(Direction::In.sign(5), 5);
        assert_eq!(Direction::Out.sign(5), -5);
        assert_eq!(serde_json::from_str::<Direction>("\"OUT\"").unwrap(), Direction::Out);
        assert!("SIDEWAYS".parse::<Direction>().is_err());
    }
}
