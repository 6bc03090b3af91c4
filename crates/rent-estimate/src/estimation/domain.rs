use std::fmt;

use serde::{Deserialize, Serialize};

/// Building category a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HousingType {
    #[serde(rename = "연립다세대", alias = "villa")]
    Villa,
    #[serde(rename = "오피스텔", alias = "officetel")]
    Officetel,
}

impl HousingType {
    pub const ALL: [HousingType; 2] = [HousingType::Villa, HousingType::Officetel];

    /// Label used by the disclosure data and the model artifact.
    pub fn label(self) -> &'static str {
        match self {
            HousingType::Villa => "연립다세대",
            HousingType::Officetel => "오피스텔",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.label() == trimmed || kind.identifier().eq_ignore_ascii_case(trimmed)
        })
    }

    fn identifier(self) -> &'static str {
        match self {
            HousingType::Villa => "villa",
            HousingType::Officetel => "officetel",
        }
    }
}

impl fmt::Display for HousingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lease structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RentType {
    /// Lump-sum refundable deposit, no periodic rent.
    #[serde(rename = "전세", alias = "jeonse")]
    Jeonse,
    /// Smaller deposit plus monthly rent.
    #[serde(rename = "월세", alias = "wolse")]
    Wolse,
}

impl RentType {
    pub const ALL: [RentType; 2] = [RentType::Jeonse, RentType::Wolse];

    pub fn label(self) -> &'static str {
        match self {
            RentType::Jeonse => "전세",
            RentType::Wolse => "월세",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.label() == trimmed || kind.identifier().eq_ignore_ascii_case(trimmed)
        })
    }

    fn identifier(self) -> &'static str {
        match self {
            RentType::Jeonse => "jeonse",
            RentType::Wolse => "wolse",
        }
    }
}

impl fmt::Display for RentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decimal-degree position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

pub const MIN_YEAR_BUILT: i32 = 1900;
pub const MAX_YEAR_BUILT: i32 = 2100;
pub const MIN_ADDRESS_CHARS: usize = 2;

/// Listing attributes a caller asks us to price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub housing_type: HousingType,
    pub rent_type: RentType,
    /// 시군구 + 번지 address.
    pub address: String,
    /// Exclusive floor area in square metres.
    pub area: f64,
    pub floor: i32,
    pub year_built: i32,
}

impl PredictionRequest {
    /// Checks the ranges the estimator relies on. The estimator itself never re-validates.
    pub fn validate(self) -> Result<Self, RequestValidationError> {
        let address = self.address.trim().to_string();
        if address.chars().count() < MIN_ADDRESS_CHARS {
            return Err(RequestValidationError::AddressTooShort);
        }
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(RequestValidationError::NonPositiveArea(self.area));
        }
        if !(MIN_YEAR_BUILT..=MAX_YEAR_BUILT).contains(&self.year_built) {
            return Err(RequestValidationError::YearBuiltOutOfRange(self.year_built));
        }

        Ok(Self { address, ..self })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("address must contain at least 2 characters")]
    AddressTooShort,
    #[error("area must be a positive number of square metres, got {0}")]
    NonPositiveArea(f64),
    #[error("year_built must be between 1900 and 2100, got {0}")]
    YearBuiltOutOfRange(i32),
}

/// Non-negative estimate in 만원 (10,000 KRW).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PredictionResult(f64);

impl PredictionResult {
    /// Clamps negative or NaN model output to zero.
    pub fn from_raw(value: f64) -> Self {
        Self(if value > 0.0 { value } else { 0.0 })
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Two-decimal rounding used for display and API payloads.
    pub fn rounded(self) -> f64 {
        round2(self.0)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
