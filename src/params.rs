//! Lattice parameter store
//!
//! Parameters of one FFA cell, stored in a JSON file and read in/out
//! under their historical names:
//!
//! - angles (deg): `theta_c` total cell, `theta_ld` long drift, `theta_d`
//!   D magnet, `theta_sd` short drift between D and F, `theta_f` F magnet
//! - fields: `B0_d`/`B0_f` reference fields (T), `k_d`/`k_f` field indices,
//!   `r0` reference radius (cm)
//! - misc: `N_cell` cells to model, `name`, `r_min`/`r_max` orbit radii for
//!   display (cm)

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LatticeError, Result};

/// Allowed mismatch between the summed cell angles and `theta_c` (deg)
pub const ANGLE_TOLERANCE: f64 = 1e-9;

/// Every key of the parameter set, in file order
pub const PARAM_NAMES: [&str; 14] = [
    "theta_c", "theta_ld", "theta_d", "theta_sd", "theta_f", "B0_d", "B0_f", "r0", "k_d", "k_f",
    "N_cell", "name", "r_min", "r_max",
];

/// One FFA cell's parameters
///
/// Unknown keys are rejected so a file written with per-magnet reference
/// radii (`r0_d`/`r0_f`) fails to load instead of being half-read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatticeParams {
    pub theta_c: f64,
    pub theta_ld: f64,
    pub theta_d: f64,
    pub theta_sd: f64,
    pub theta_f: f64,

    #[serde(rename = "B0_d")]
    pub b0_d: f64,
    #[serde(rename = "B0_f")]
    pub b0_f: f64,
    pub r0: f64,
    pub k_d: f64,
    pub k_f: f64,

    #[serde(rename = "N_cell")]
    pub n_cell: u32,
    pub name: String,
    pub r_min: f64,
    pub r_max: f64,
}

impl Default for LatticeParams {
    /// Approximate parameters of the KURRI main ring
    fn default() -> Self {
        Self {
            theta_c: 30.0,
            theta_ld: 4.75,
            theta_d: 3.43,
            theta_sd: 1.7,
            theta_f: 10.24,

            // F and D share magnitudes, with opposite field sign
            b0_d: -1.6,
            b0_f: 1.6,
            r0: 540.0,
            k_d: 7.7,
            k_f: 7.7,

            n_cell: 1,
            name: "Default KURRI Cell".to_string(),
            r_min: 485.4,
            r_max: 540.0,
        }
    }
}

/// Default parameter set, freshly built on every call
pub fn default_params() -> LatticeParams {
    LatticeParams::default()
}

/// A single parameter value looked up by name
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Count(u32),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Count(n) => Some(f64::from(*n)),
            ParamValue::Text(_) => None,
        }
    }
}

impl LatticeParams {
    /// Look a parameter up by its file key
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let value = match name {
            "theta_c" => ParamValue::Number(self.theta_c),
            "theta_ld" => ParamValue::Number(self.theta_ld),
            "theta_d" => ParamValue::Number(self.theta_d),
            "theta_sd" => ParamValue::Number(self.theta_sd),
            "theta_f" => ParamValue::Number(self.theta_f),
            "B0_d" => ParamValue::Number(self.b0_d),
            "B0_f" => ParamValue::Number(self.b0_f),
            "r0" => ParamValue::Number(self.r0),
            "k_d" => ParamValue::Number(self.k_d),
            "k_f" => ParamValue::Number(self.k_f),
            "N_cell" => ParamValue::Count(self.n_cell),
            "name" => ParamValue::Text(self.name.clone()),
            "r_min" => ParamValue::Number(self.r_min),
            "r_max" => ParamValue::Number(self.r_max),
            _ => return None,
        };
        Some(value)
    }

    /// The angular subset used to lay out the cell
    pub fn angles(&self) -> CellAngles {
        CellAngles {
            theta_c: self.theta_c,
            theta_ld: self.theta_ld,
            theta_d: self.theta_d,
            theta_sd: self.theta_sd,
            theta_f: self.theta_f,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Read a parameter file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| LatticeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_json(&json).map_err(|source| LatticeError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded lattice '{}' from {:?}", params.name, path);
        Ok(params)
    }

    /// Write this parameter set as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json().map_err(|source| LatticeError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| LatticeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Angular extents of one cell, in degrees
///
/// The cell reads `LD, D, SD, F, SD, D, LD` from 0 to `theta_c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellAngles {
    pub theta_c: f64,
    pub theta_ld: f64,
    pub theta_d: f64,
    pub theta_sd: f64,
    pub theta_f: f64,
}

impl CellAngles {
    /// Sum of every drift and magnet in the cell
    pub fn total(&self) -> f64 {
        2.0 * self.theta_ld + 2.0 * self.theta_d + 2.0 * self.theta_sd + self.theta_f
    }

    /// Check that the pieces fill `theta_c` exactly
    pub fn check(&self) -> Result<()> {
        let sum = self.total();
        if (sum - self.theta_c).abs() > ANGLE_TOLERANCE {
            return Err(LatticeError::AngleSum {
                sum,
                theta_c: self.theta_c,
            });
        }
        Ok(())
    }
}

/// Length unit of stored and displayed distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthUnit {
    Meter,
    Centimeter,
}

impl LengthUnit {
    /// Convert from this unit to meters
    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            LengthUnit::Centimeter => value * 1e-2,
        }
    }

    /// Convert from meters to this unit
    pub fn from_meters(&self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            LengthUnit::Centimeter => value * 1e2,
        }
    }

    /// Get scale factor to convert from one unit to another
    pub fn scale_to(&self, target: &LengthUnit) -> f64 {
        target.from_meters(self.to_meters(1.0))
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meter => "m",
            LengthUnit::Centimeter => "cm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_repeatable() {
        let a = default_params();
        let b = default_params();
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_angles_fill_cell() {
        let angles = default_params().angles();
        assert!((angles.total() - 30.0).abs() < 1e-9);
        assert!(angles.check().is_ok());
    }

    #[test]
    fn test_angle_mismatch_is_reported() {
        let mut params = default_params();
        params.theta_f = 11.0;
        match params.angles().check() {
            Err(LatticeError::AngleSum { sum, theta_c }) => {
                assert!((sum - 30.76).abs() < 1e-9);
                assert_eq!(theta_c, 30.0);
            }
            other => panic!("Expected AngleSum, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let params = default_params();
        for name in PARAM_NAMES {
            assert!(params.get(name).is_some(), "missing {}", name);
        }
        assert_eq!(params.get("B0_d"), Some(ParamValue::Number(-1.6)));
        assert_eq!(params.get("N_cell"), Some(ParamValue::Count(1)));
        assert_eq!(
            params.get("name"),
            Some(ParamValue::Text("Default KURRI Cell".to_string()))
        );
        assert_eq!(params.get("N_cell").and_then(|v| v.as_f64()), Some(1.0));
        assert_eq!(params.get("name").and_then(|v| v.as_f64()), None);
        assert_eq!(params.get("r0_d"), None);
    }

    #[test]
    fn test_json_uses_file_keys() {
        let json = default_params().to_json().unwrap();
        assert!(json.contains("\"B0_f\": 1.6"));
        assert!(json.contains("\"N_cell\": 1"));
        assert!(json.contains("\"theta_ld\": 4.75"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lattice.json");

        let mut params = default_params();
        params.name = "Shifted cell".to_string();
        params.k_f = 7.6;
        params.save(&path).unwrap();

        let loaded = LatticeParams::load(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_split_radius_schema_is_rejected() {
        let json = r#"{
            "theta_c": 30.0, "theta_ld": 4.75, "theta_d": 3.43,
            "theta_sd": 1.7, "theta_f": 10.24,
            "B0_d": -1.6, "B0_f": 1.6, "r0_d": 540, "r0_f": 540,
            "k_d": 7.7, "k_f": 7.7, "N_cell": 1
        }"#;
        let err = LatticeParams::from_json(json).unwrap_err();
        assert!(err.to_string().contains("r0_d"), "{}", err);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LatticeParams::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LatticeError::Io { .. }));
    }

    #[test]
    fn test_unit_conversion() {
        assert!((LengthUnit::Centimeter.scale_to(&LengthUnit::Meter) - 0.01).abs() < 1e-12);
        assert!((LengthUnit::Centimeter.to_meters(540.0) - 5.4).abs() < 1e-12);
    }
}
