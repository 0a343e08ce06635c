use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    #[default]
    Ward,
    EmergencyRoom,
    IntensiveCare,
    OperatingRoom,
    Pharmacy,
    Warehouse,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ward => "ward",
            Self::EmergencyRoom => "emergency_room",
            Self::IntensiveCare => "intensive_care",
            Self::OperatingRoom => "operating_room",
            Self::Pharmacy => "pharmacy",
            Self::Warehouse => "warehouse",
        }
    }
}

impl std::str::FromStr for LocationKind {
    type Err = ();

    // Unknown kinds read back as plain wards rather than failing the row.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "emergency_room" => Ok(Self::EmergencyRoom),
            "intensive_care" => Ok(Self::IntensiveCare),
            "operating_room" => Ok(Self::OperatingRoom),
            "pharmacy" => Ok(Self::Pharmacy),
            "warehouse" => Ok(Self::Warehouse),
            _ => Ok(Self::Ward),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    pub created_at: DateTime<Utc>,
}
