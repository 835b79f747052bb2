//! Body metrics reported alongside recommendations.
//!
//! - BMI: weight (kg) / height (m)²
//! - BMR: Mifflin-St Jeor, `10·w + 6.25·h − 5·age + s` with s = +5 (male), −161 (female)
//! - TDEE: BMR × activity factor
//!
//! All values are rounded to two decimals, matching what the history log stores.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// `M...` is male; anything else is treated as female.
    pub fn parse(input: &str) -> Self {
        match input.trim().chars().next() {
            Some(c) if c.eq_ignore_ascii_case(&'m') => Self::Male,
            _ => Self::Female,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// Accepts English and Swahili labels; unknown labels fall back to `Moderate`.
    pub fn parse(input: &str) -> Self {
        let normalized: String = input
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "sedentary" | "bilaharakati" => Self::Sedentary,
            "light" | "kidogo" => Self::Light,
            "moderate" | "kwakawaida" => Self::Moderate,
            "veryactive" | "wengi" => Self::VeryActive,
            "extraactive" | "wengisana" => Self::ExtraActive,
            _ => {
                log::warn!("unknown activity level {input:?}, using moderate");
                Self::Moderate
            }
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyProfile {
    pub weight_kg: f64,
    pub height_m: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity: ActivityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub bmr: f64,
    pub tdee: f64,
}

impl BodyProfile {
    pub fn metrics(&self) -> BodyMetrics {
        let bmr = bmr(self.weight_kg, (self.height_m * 100.0).round(), self.age, self.sex);
        BodyMetrics {
            bmi: bmi(self.weight_kg, self.height_m),
            bmr,
            tdee: tdee(bmr, self.activity),
        }
    }
}

pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    if height_m > 0.0 {
        round2(weight_kg / (height_m * height_m))
    } else {
        0.0
    }
}

pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let constant = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    round2(10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + constant)
}

pub fn tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    round2(bmr * activity.factor())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_basic() {
        assert_eq!(bmi(60.0, 1.7), 20.76);
        assert_eq!(bmi(60.0, 0.0), 0.0);
    }

    #[test]
    fn bmr_mifflin_st_jeor() {
        // 10*60 + 6.25*170 - 5*25 + 5 = 1542.5
        assert_eq!(bmr(60.0, 170.0, 25, Sex::Male), 1542.5);
        // same with -161
        assert_eq!(bmr(60.0, 170.0, 25, Sex::Female), 1376.5);
    }

    #[test]
    fn tdee_factors() {
        assert_eq!(tdee(1000.0, ActivityLevel::Sedentary), 1200.0);
        assert_eq!(tdee(1542.5, ActivityLevel::Moderate), 2390.88);
    }

    #[test]
    fn profile_rounds_height_to_cm() {
        let profile = BodyProfile {
            weight_kg: 60.0,
            height_m: 1.7,
            age: 25,
            sex: Sex::Male,
            activity: ActivityLevel::Moderate,
        };
        let m = profile.metrics();
        assert_eq!(m.bmi, 20.76);
        assert_eq!(m.bmr, 1542.5);
        assert_eq!(m.tdee, 2390.88);
    }

    #[test]
    fn parse_labels() {
        assert_eq!(Sex::parse("M - Mume"), Sex::Male);
        assert_eq!(Sex::parse("f"), Sex::Female);
        assert_eq!(Sex::parse(""), Sex::Female);
        assert_eq!(ActivityLevel::parse("Very Active"), ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::parse("Wengi Sana"), ActivityLevel::ExtraActive);
        assert_eq!(ActivityLevel::parse("Bila Harakati"), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::parse("couch"), ActivityLevel::Moderate);
    }
}
