//! Erosion simulation parameters and configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// Short-lived droplets, subtle smoothing
    Gentle,
    /// Balanced erosion
    #[default]
    Normal,
    /// Long-lived, aggressive droplets carving deep gullies
    Dramatic,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Gentle, Self::Normal, Self::Dramatic]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Gentle => "Subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Dramatic => "Deep gullies and fans",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gentle => write!(f, "gentle"),
            Self::Normal => write!(f, "normal"),
            Self::Dramatic => write!(f, "dramatic"),
        }
    }
}

impl std::str::FromStr for ErosionPreset {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gentle" => Ok(Self::Gentle),
            "normal" => Ok(Self::Normal),
            "dramatic" => Ok(Self::Dramatic),
            other => Err(TerrainError::invalid_parameter(
                "preset",
                format!("unknown preset `{}`", other),
            )),
        }
    }
}

/// Largest accepted brush radius, in cells.
pub const MAX_BRUSH_RADIUS: usize = 256;

/// Droplet erosion parameters, fixed for the duration of a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParameters {
    /// Maximum number of steps a droplet is simulated for
    pub lifetime: usize,

    /// Momentum conservation factor (0.0-1.0)
    /// Higher values = droplets keep their direction and ignore the slope longer
    pub inertia: f32,

    /// Sediment carrying capacity multiplier
    pub sediment_capacity_factor: f32,

    /// Capacity floor so droplets on flat ground can still carry a little
    pub min_sediment_capacity: f32,

    /// Fraction of excess sediment dropped per step (0.0-1.0)
    pub deposit_speed: f32,

    /// Fraction of free capacity picked up per step (0.0-1.0)
    pub erode_speed: f32,

    /// Water evaporation rate per step (0.0-1.0)
    pub evaporate_speed: f32,

    /// Gravity factor affecting droplet acceleration
    pub gravity: f32,

    /// Radius of the erosion brush (in cells, at most [`MAX_BRUSH_RADIUS`])
    pub brush_radius: usize,
}

impl Default for ErosionParameters {
    fn default() -> Self {
        Self {
            lifetime: 30,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            deposit_speed: 0.3,
            erode_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            brush_radius: 3,
        }
    }
}

impl ErosionParameters {
    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::Gentle => Self {
                lifetime: 20,
                erode_speed: 0.1,
                deposit_speed: 0.5,
                brush_radius: 4,
                ..Default::default()
            },
            ErosionPreset::Normal => Self::default(),
            ErosionPreset::Dramatic => Self {
                lifetime: 64,
                inertia: 0.1,
                sediment_capacity_factor: 8.0,
                erode_speed: 0.5,
                deposit_speed: 0.2,
                brush_radius: 2,
                ..Default::default()
            },
        }
    }

    /// Reject parameter sets that would make the simulation diverge.
    pub fn validate(&self) -> Result<()> {
        unit_interval("inertia", self.inertia)?;
        unit_interval("deposit_speed", self.deposit_speed)?;
        unit_interval("erode_speed", self.erode_speed)?;
        unit_interval("evaporate_speed", self.evaporate_speed)?;
        non_negative("sediment_capacity_factor", self.sediment_capacity_factor)?;
        non_negative("min_sediment_capacity", self.min_sediment_capacity)?;
        non_negative("gravity", self.gravity)?;
        if self.brush_radius > MAX_BRUSH_RADIUS {
            return Err(TerrainError::invalid_parameter(
                "brush_radius",
                format!("must be at most {}, got {}", MAX_BRUSH_RADIUS, self.brush_radius),
            ));
        }
        Ok(())
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TerrainError::invalid_parameter(
            name,
            format!("must lie in [0, 1], got {}", value),
        ))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::invalid_parameter(
            name,
            format!("must be finite and non-negative, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for &preset in ErosionPreset::all() {
            ErosionParameters::from_preset(preset).validate().unwrap();
        }
    }

    #[test]
    fn test_preset_round_trips_through_name() {
        for &preset in ErosionPreset::all() {
            assert_eq!(preset.to_string().parse::<ErosionPreset>().unwrap(), preset);
        }
        assert!("volcanic".parse::<ErosionPreset>().is_err());
    }

    #[test]
    fn test_oversized_brush_radius_rejected() {
        let params = ErosionParameters {
            brush_radius: 50_000,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(TerrainError::InvalidParameter { name: "brush_radius", .. })
        ));

        let largest = ErosionParameters {
            brush_radius: MAX_BRUSH_RADIUS,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_inertia_rejected() {
        let params = ErosionParameters {
            inertia: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(TerrainError::InvalidParameter { name: "inertia", .. })
        ));
    }

    #[test]
    fn test_nan_gravity_rejected() {
        let params = ErosionParameters {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
