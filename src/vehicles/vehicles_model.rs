use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LABOR_HOURS, DEFAULT_TUBE_QTY};

/// Country the lookup is performed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Country {
    #[default]
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "CA")]
    Ca,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Us => "US",
            Country::Ca => "CA",
        }
    }
}

/// Glass position on the vehicle, as customers select it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlassType {
    Windshield,
    BackGlass,
    DoorFrontLeft,
    DoorFrontRight,
    DoorRearLeft,
    DoorRearRight,
    VentFrontLeft,
    VentFrontRight,
    VentRearLeft,
    VentRearRight,
}

/// Glass kind parameter understood by the primary provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlassKind {
    Windshield,
    Back,
    Door,
    Vent,
}

impl GlassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlassKind::Windshield => "Windshield",
            GlassKind::Back => "Back",
            GlassKind::Door => "Door",
            GlassKind::Vent => "Vent",
        }
    }
}

impl GlassType {
    /// Customer-facing label, used on quote line items
    pub fn label(&self) -> &'static str {
        match self {
            GlassType::Windshield => "Windshield",
            GlassType::BackGlass => "Back Glass",
            GlassType::DoorFrontLeft => "Front Left Door Glass",
            GlassType::DoorFrontRight => "Front Right Door Glass",
            GlassType::DoorRearLeft => "Rear Left Door Glass",
            GlassType::DoorRearRight => "Rear Right Door Glass",
            GlassType::VentFrontLeft => "Front Left Vent Glass",
            GlassType::VentFrontRight => "Front Right Vent Glass",
            GlassType::VentRearLeft => "Rear Left Vent Glass",
            GlassType::VentRearRight => "Rear Right Vent Glass",
        }
    }

    /// Maps a glass position to the provider's kind parameter
    pub fn provider_kind(&self) -> GlassKind {
        match self {
            GlassType::Windshield => GlassKind::Windshield,
            GlassType::BackGlass => GlassKind::Back,
            GlassType::DoorFrontLeft
            | GlassType::DoorFrontRight
            | GlassType::DoorRearLeft
            | GlassType::DoorRearRight => GlassKind::Door,
            GlassType::VentFrontLeft
            | GlassType::VentFrontRight
            | GlassType::VentRearLeft
            | GlassType::VentRearRight => GlassKind::Vent,
        }
    }

    /// Part-number prefixes (domestic, foreign) used to filter the NAGS
    /// catalog for this glass position.
    pub fn catalog_prefixes(&self) -> (&'static str, &'static str) {
        match self {
            GlassType::BackGlass => ("DB", "FB"),
            GlassType::DoorFrontLeft
            | GlassType::DoorFrontRight
            | GlassType::DoorRearLeft
            | GlassType::DoorRearRight => ("DT", "FT"),
            _ => ("DW", "FW"),
        }
    }
}

/// Which data source produced a lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Primary provider (parts + calibration, no authoritative list price)
    Autobolt,
    /// NHTSA vehicle decode + NAGS catalog parts (no calibration data)
    NhtsaNags,
    /// NAGS catalog only, direct year/make/model lookup
    Nags,
    /// Replayed from the resolution cache
    Cache,
}

impl Provenance {
    /// True for paths that can never carry calibration data
    pub fn lacks_calibration_data(&self) -> bool {
        matches!(self, Provenance::NhtsaNags | Provenance::Nags)
    }
}

/// Where an individual part's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSource {
    Autobolt,
    Nags,
    Cache,
    Manual,
}

/// Confidence in a lookup result, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// List price for a part. Providers may omit pricing entirely, and a
/// missing price must never silently collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ListPrice {
    Priced(Decimal),
    #[default]
    Unpriced,
}

impl ListPrice {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            ListPrice::Priced(amount) => Some(*amount),
            ListPrice::Unpriced => None,
        }
    }

    pub fn is_unpriced(&self) -> bool {
        matches!(self, ListPrice::Unpriced)
    }
}

/// Structured reason a quote was routed to human review. Reasons accumulate
/// in order; downstream consumers get codes instead of concatenated strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReviewReason {
    MultipleParts { count: usize },
    NoPartsFound,
    MissingCalibrationData,
    MissingListPrice { count: usize },
    IncompleteVehicleData { year: i32, make: String, model: String },
    ReferenceLookupFailed { detail: String },
    PriceOutOfBounds { total: String, min: String, max: String },
    ManualPricingRequired,
}

impl std::fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewReason::MultipleParts { count } => {
                write!(f, "Multiple parts available ({} options)", count)
            }
            ReviewReason::NoPartsFound => write!(f, "No parts found"),
            ReviewReason::MissingCalibrationData => {
                write!(f, "No calibration data available (fallback lookup)")
            }
            ReviewReason::MissingListPrice { count } => {
                write!(f, "{} part(s) missing list price", count)
            }
            ReviewReason::IncompleteVehicleData { year, make, model } => write!(
                f,
                "Incomplete vehicle data (year: {}, make: {}, model: {})",
                year, make, model
            ),
            ReviewReason::ReferenceLookupFailed { detail } => {
                write!(f, "Parts catalog lookup failed: {}", detail)
            }
            ReviewReason::PriceOutOfBounds { total, min, max } => {
                write!(f, "Price ${} outside bounds (${}-${})", total, min, max)
            }
            ReviewReason::ManualPricingRequired => {
                write!(f, "Glass type requires manual pricing")
            }
        }
    }
}

/// One candidate replacement part for a vehicle.
///
/// Parts from the primary provider carry calibration data but usually no
/// list price; catalog parts carry pricing and labor but never calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlassPart {
    /// Base part number, e.g. "FW03898"
    pub part_number: String,
    /// Variant-qualified part number with color suffix, e.g. "FW03898GTYN"
    pub full_part_number: Option<String>,
    /// Two-letter category prefix (DW, DT, FW, FT, ...)
    pub prefix_cd: String,
    pub list_price: ListPrice,
    /// None, or e.g. "Static", "Dynamic", "Dual: Static + Dynamic"
    pub calibration_type: Option<String>,
    pub features: Vec<String>,
    pub photo_urls: Vec<String>,
    /// Urethane tubes needed
    pub tube_qty: Decimal,
    pub labor_hours: Decimal,
    /// Extra labor notes, e.g. "+0.5 hrs"
    pub additional_labor: String,
    pub moulding_required: bool,
    pub clips_required: bool,
    pub source: PartSource,
}

impl GlassPart {
    pub fn new(part_number: impl Into<String>, source: PartSource) -> Self {
        let part_number = part_number.into();
        let mut part = GlassPart {
            part_number,
            full_part_number: None,
            prefix_cd: String::new(),
            list_price: ListPrice::Unpriced,
            calibration_type: None,
            features: Vec::new(),
            photo_urls: Vec::new(),
            tube_qty: DEFAULT_TUBE_QTY,
            labor_hours: DEFAULT_LABOR_HOURS,
            additional_labor: String::new(),
            moulding_required: false,
            clips_required: false,
            source,
        };
        part.normalize_prefix();
        part
    }

    /// Fills the category prefix from the part number when unset
    pub fn normalize_prefix(&mut self) {
        if self.prefix_cd.is_empty() && self.part_number.chars().count() >= 2 {
            self.prefix_cd = self
                .part_number
                .chars()
                .take(2)
                .collect::<String>()
                .to_uppercase();
        }
    }

    /// Calibration is required iff a calibration type is set and not "none"
    pub fn calibration_required(&self) -> bool {
        self.calibration_type
            .as_deref()
            .map(|t| !t.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
    }
}

/// Outcome of one vehicle/parts resolution call.
///
/// Review flags are derived from the part list and provenance; call
/// [`derive_flags`](Self::derive_flags) after any mutation of `parts` so the
/// flags never drift out of sync with the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLookupResult {
    pub provenance: Provenance,
    pub vin: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub body_style: Option<String>,
    pub trim: Option<String>,
    pub parts: Vec<GlassPart>,
    pub needs_part_selection: bool,
    pub needs_calibration_review: bool,
    pub needs_manual_review: bool,
    pub confidence: Confidence,
    pub review_reasons: Vec<ReviewReason>,
    /// Raw provider payload, kept for audit
    pub raw_response: serde_json::Value,
}

impl VehicleLookupResult {
    pub fn new(
        provenance: Provenance,
        vin: impl Into<String>,
        year: i32,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        VehicleLookupResult {
            provenance,
            vin: vin.into(),
            year,
            make: make.into(),
            model: model.into(),
            body_style: None,
            trim: None,
            parts: Vec::new(),
            needs_part_selection: false,
            needs_calibration_review: false,
            needs_manual_review: false,
            confidence: Confidence::High,
            review_reasons: Vec::new(),
            raw_response: serde_json::Value::Null,
        }
    }

    /// Recomputes the derived review flags from the current part list and
    /// provenance, keeping the structured reasons in sync.
    pub fn derive_flags(&mut self) {
        self.needs_part_selection = self.parts.len() > 1;
        self.review_reasons
            .retain(|r| !matches!(r, ReviewReason::MultipleParts { .. }));
        if self.needs_part_selection {
            self.review_reasons.push(ReviewReason::MultipleParts {
                count: self.parts.len(),
            });
        }

        if self.provenance.lacks_calibration_data() {
            let has_calibration = self.parts.iter().any(|p| p.calibration_type.is_some());
            self.needs_calibration_review = !has_calibration;
            self.review_reasons
                .retain(|r| !matches!(r, ReviewReason::MissingCalibrationData));
            if self.needs_calibration_review {
                self.review_reasons.push(ReviewReason::MissingCalibrationData);
                if self.confidence > Confidence::Medium {
                    self.confidence = Confidence::Medium;
                }
            }
        }
    }

    /// Appends a reason unless an identical one is already recorded
    pub fn add_review_reason(&mut self, reason: ReviewReason) {
        if !self.review_reasons.contains(&reason) {
            self.review_reasons.push(reason);
        }
    }

    /// Union of the three review flags, always recomputed
    pub fn needs_review(&self) -> bool {
        self.needs_part_selection || self.needs_calibration_review || self.needs_manual_review
    }

    /// The primary (first) part, if any
    pub fn primary_part(&self) -> Option<&GlassPart> {
        self.parts.first()
    }

    /// Narrows the result to a single pre-selected part when it is present
    /// in the current list. Returns whether the part was found.
    pub fn select_part(&mut self, part_number: &str) -> bool {
        match self.parts.iter().position(|p| p.part_number == part_number) {
            Some(idx) => {
                let selected = self.parts.swap_remove(idx);
                self.parts = vec![selected];
                self.derive_flags();
                true
            }
            None => false,
        }
    }

    /// Human-readable review summary, "; "-joined in order
    pub fn review_summary(&self) -> Option<String> {
        if self.review_reasons.is_empty() {
            return None;
        }
        Some(
            self.review_reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

lazy_static! {
    static ref PLATE_RE: Regex = Regex::new(r"^[A-Z0-9\s-]+$").unwrap();
}

/// VIN check-digit validation per ISO 3779
pub fn validate_vin(vin: &str) -> bool {
    let vin = vin.to_uppercase();
    if vin.len() != 17 || vin.contains(['I', 'O', 'Q']) {
        return false;
    }

    const WEIGHTS: [u32; 17] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

    fn transliterate(c: char) -> Option<u32> {
        match c {
            '0'..='9' => c.to_digit(10),
            'A' | 'J' => Some(1),
            'B' | 'K' | 'S' => Some(2),
            'C' | 'L' | 'T' => Some(3),
            'D' | 'M' | 'U' => Some(4),
            'E' | 'N' | 'V' => Some(5),
            'F' | 'W' => Some(6),
            'G' | 'P' | 'X' => Some(7),
            'H' | 'Y' => Some(8),
            'R' | 'Z' => Some(9),
            _ => None,
        }
    }

    let mut checksum = 0u32;
    for (i, c) in vin.chars().enumerate() {
        if i == 8 {
            continue;
        }
        match transliterate(c) {
            Some(value) => checksum += value * WEIGHTS[i],
            None => return false,
        }
    }

    let remainder = checksum % 11;
    let check_digit = if remainder == 10 {
        'X'
    } else {
        char::from_digit(remainder, 10).unwrap()
    };

    vin.chars().nth(8) == Some(check_digit)
}

/// Basic license plate and state format validation
pub fn validate_plate(plate: &str, state: &str) -> bool {
    if plate.trim().is_empty() || state.len() != 2 {
        return false;
    }
    PLATE_RE.is_match(&plate.to_uppercase())
}
