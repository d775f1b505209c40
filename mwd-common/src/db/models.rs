//! Database row models
//!
//! JSON field names follow the column headers of the drill-rig exports
//! (`holeID`, `PenetrRate`, ...) so that exported files can be posted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// One of the five canonical MWD sensor channels, in canonical column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    PenetrRate,
    PercPressure,
    FeedPressure,
    RotPressure,
    InstRotPressure,
}

impl Feature {
    /// Canonical column order; conditioned matrices and weights follow it
    pub const ALL: [Feature; 5] = [
        Feature::PenetrRate,
        Feature::PercPressure,
        Feature::FeedPressure,
        Feature::RotPressure,
        Feature::InstRotPressure,
    ];

    /// Column header as it appears in rig exports and API paths
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::PenetrRate => "PenetrRate",
            Feature::PercPressure => "PercPressure",
            Feature::FeedPressure => "FeedPressure",
            Feature::RotPressure => "RotPressure",
            Feature::InstRotPressure => "InstRotPressure",
        }
    }

    /// Human-readable axis label
    pub fn description(self) -> &'static str {
        match self {
            Feature::PenetrRate => "Penetration rate",
            Feature::PercPressure => "Percussion pressure",
            Feature::FeedPressure => "Feed pressure",
            Feature::RotPressure => "Rotation pressure",
            Feature::InstRotPressure => "Instantaneous rotation pressure",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.column_name() == s)
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

/// One sensor reading at a given depth within one hole of one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MwdSample {
    #[serde(rename = "projectID")]
    pub project_id: String,
    /// Acquisition order within the project
    #[serde(rename = "index")]
    pub sample_index: i64,
    #[serde(rename = "holeID")]
    pub hole_id: String,
    #[serde(rename = "Depth")]
    pub depth: f64,
    #[serde(rename = "PenetrRate")]
    pub penetr_rate: f64,
    #[serde(rename = "PercPressure")]
    pub perc_pressure: f64,
    #[serde(rename = "FeedPressure")]
    pub feed_pressure: f64,
    #[serde(rename = "RotPressure")]
    pub rot_pressure: f64,
    #[serde(rename = "InstRotPressure")]
    pub inst_rot_pressure: f64,
    #[serde(rename = "Time")]
    pub time: Option<String>,
}

impl MwdSample {
    /// Feature values in canonical column order
    pub fn features(&self) -> [f64; 5] {
        [
            self.penetr_rate,
            self.perc_pressure,
            self.feed_pressure,
            self.rot_pressure,
            self.inst_rot_pressure,
        ]
    }

    pub fn feature(&self, feature: Feature) -> f64 {
        self.features()[feature.index()]
    }
}

/// Ingest payload for one sample; project and index come from the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSample {
    #[serde(rename = "holeID")]
    pub hole_id: String,
    #[serde(rename = "Depth")]
    pub depth: f64,
    #[serde(rename = "PenetrRate")]
    pub penetr_rate: f64,
    #[serde(rename = "PercPressure")]
    pub perc_pressure: f64,
    #[serde(rename = "FeedPressure")]
    pub feed_pressure: f64,
    #[serde(rename = "RotPressure")]
    pub rot_pressure: f64,
    #[serde(rename = "InstRotPressure")]
    pub inst_rot_pressure: f64,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
}

impl NewSample {
    fn values(&self) -> [f64; 6] {
        [
            self.depth,
            self.penetr_rate,
            self.perc_pressure,
            self.feed_pressure,
            self.rot_pressure,
            self.inst_rot_pressure,
        ]
    }

    /// Reject rows that would poison the batch statistics
    pub fn validate(&self) -> crate::Result<()> {
        if self.hole_id.trim().is_empty() {
            return Err(Error::InvalidInput("holeID must not be empty".to_string()));
        }
        if self.values().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-finite measurement in hole {} at depth {}",
                self.hole_id, self.depth
            )));
        }
        Ok(())
    }
}

/// Collar location of a drilled hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HolePosition {
    #[serde(rename = "holeID")]
    pub hole_id: String,
    pub easting: f64,
    pub northing: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

/// User-entered assessment of a blast at a given hole and depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlastReport {
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(rename = "holeID")]
    pub hole_id: String,
    pub depth: f64,
    pub report: String,
    pub score: i64,
}

/// Maximum stored narrative length, in characters
pub const MAX_REPORT_LEN: usize = 255;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_round_trips_column_name() {
        for feature in Feature::ALL {
            assert_eq!(feature.column_name().parse::<Feature>().unwrap(), feature);
        }
    }

    #[test]
    fn test_unknown_feature_name() {
        let err = "Torque".parse::<Feature>().unwrap_err();
        assert!(matches!(err, Error::UnknownFeature(name) if name == "Torque"));
    }

    #[test]
    fn test_feature_index_matches_canonical_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_new_sample_rejects_nan() {
        let sample = NewSample {
            hole_id: "H1".to_string(),
            depth: 1.0,
            penetr_rate: f64::NAN,
            perc_pressure: 1.0,
            feed_pressure: 1.0,
            rot_pressure: 1.0,
            inst_rot_pressure: 1.0,
            time: None,
        };
        assert!(matches!(sample.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_sample_json_uses_export_headers() {
        let json = serde_json::json!({
            "holeID": "A-01",
            "Depth": 2.5,
            "PenetrRate": 1.0,
            "PercPressure": 2.0,
            "FeedPressure": 3.0,
            "RotPressure": 4.0,
            "InstRotPressure": 5.0
        });
        let sample: NewSample = serde_json::from_value(json).unwrap();
        assert_eq!(sample.hole_id, "A-01");
        assert_eq!(sample.inst_rot_pressure, 5.0);
        assert!(sample.time.is_none());
    }
}
