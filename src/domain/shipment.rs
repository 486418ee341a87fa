//! Shipment record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted shipment, as returned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Primary key.
    pub id: i64,

    /// Order this shipment belongs to.
    pub order_id: i64,

    /// Carrier tracking number (unique across shipments).
    pub tracking_number: String,

    /// Assigned carrier, `None` while unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,

    /// Free-form status, e.g. "in_transit".
    pub status: String,

    /// Expected delivery time, if the carrier has provided one.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rfc3339::option")]
    pub estimated_delivery: Option<DateTime<Utc>>,

    #[serde(with = "rfc3339")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "rfc3339")]
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Normalize a raw carrier column: an empty string means "unassigned".
    pub fn normalize_carrier(carrier: Option<String>) -> Option<String> {
        carrier.filter(|c| !c.is_empty())
    }
}

/// RFC3339 timestamps with whole-second precision and a `Z` suffix.
pub(crate) mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw.as_deref() {
                None | Some("") => Ok(None),
                Some(s) => DateTime::parse_from_rfc3339(s)
                    .map(|dt| Some(dt.with_timezone(&Utc)))
                    .map_err(serde::de::Error::custom),
            }
        }
    }
}
