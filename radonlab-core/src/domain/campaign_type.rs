//! Campaign types: how many distinct rooms share the six non-cellar days.

use serde::{Deserialize, Serialize};

/// Number of distinct physical rooms occupying the six room-day slots.
///
/// `Six` is the canonical 6+1 protocol. Lower types let rooms repeat across
/// days, which models protocol variants run in smaller dwellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignType {
    Six,
    Five,
    Four,
    Three,
    Two,
    One,
}

impl CampaignType {
    pub const ALL: [CampaignType; 6] = [
        CampaignType::Six,
        CampaignType::Five,
        CampaignType::Four,
        CampaignType::Three,
        CampaignType::Two,
        CampaignType::One,
    ];

    /// Number of distinct room identifiers drawn for this type.
    pub fn slot_count(self) -> usize {
        match self {
            CampaignType::Six => 6,
            CampaignType::Five => 5,
            CampaignType::Four => 4,
            CampaignType::Three => 3,
            CampaignType::Two => 2,
            CampaignType::One => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CampaignType::Six => "six",
            CampaignType::Five => "five",
            CampaignType::Four => "four",
            CampaignType::Three => "three",
            CampaignType::Two => "two",
            CampaignType::One => "one",
        }
    }
}

impl std::fmt::Display for CampaignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CampaignType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        CampaignType::ALL
            .into_iter()
            .find(|t| t.name() == lowered || t.slot_count().to_string() == lowered)
            .ok_or_else(|| format!("unknown campaign type '{s}' (expected six..one or 6..1)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_counts_descend() {
        let counts: Vec<usize> = CampaignType::ALL.iter().map(|t| t.slot_count()).collect();
        assert_eq!(counts, vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn parse_by_name_or_number() {
        assert_eq!("six".parse::<CampaignType>().unwrap(), CampaignType::Six);
        assert_eq!("Three".parse::<CampaignType>().unwrap(), CampaignType::Three);
        assert_eq!("2".parse::<CampaignType>().unwrap(), CampaignType::Two);
        assert!("seven".parse::<CampaignType>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&CampaignType::Four).unwrap();
        assert_eq!(json, "\"four\"");
        let back: CampaignType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CampaignType::Four);
    }
}
