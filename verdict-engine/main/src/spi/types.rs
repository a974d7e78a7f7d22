use std::collections::BTreeMap;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// Generates the closed canonical set together with its string table.
///
/// Keeping the variant list and the wire keys in one place means the
/// serde names, `as_str` and `from_key` cannot drift apart.
macro_rules! canonical_keys {
    ($(($variant:ident, $key:literal)),+ $(,)?) => {
        /// Closed set of item-family keys used for rule lookup.
        ///
        /// Decoders reject unknown members; free-form strings never enter
        /// the engine.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub enum Canonical {
            $(#[serde(rename = $key)] $variant,)+
        }

        impl Canonical {
            /// Every member of the closed set, `benign_general` included.
            pub const ALL: &'static [Canonical] = &[$(Canonical::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self { $(Canonical::$variant => $key,)+ }
            }

            pub fn from_key(key: &str) -> Option<Canonical> {
                match key { $($key => Some(Canonical::$variant),)+ _ => None }
            }
        }
    };
}

canonical_keys! {
    // Batteries
    (LithiumBatterySpare, "lithium_battery_spare"),
    (LithiumBatteryInstalled, "lithium_battery_installed"),
    (LithiumMetalBattery, "lithium_metal_battery"),
    (PowerBank, "power_bank"),
    (SmartLuggageBattery, "smart_luggage_battery"),
    (PowerToolBattery, "power_tool_battery"),
    (WheelchairBattery, "wheelchair_battery"),
    (EbikeBattery, "ebike_battery"),
    (ButtonCellBattery, "button_cell_battery"),
    (NimhBattery, "nimh_battery"),
    (WetCellBattery, "wet_cell_battery"),
    // Aerosols and gas sprays
    (AerosolToiletry, "aerosol_toiletry"),
    (AerosolMedicinal, "aerosol_medicinal"),
    (AerosolFlammable, "aerosol_flammable"),
    (CompressedGasSpray, "compressed_gas_spray"),
    // Liquids
    (CosmeticLiquid, "cosmetic_liquid"),
    (Perfume, "perfume"),
    (MedicinalLiquid, "medicinal_liquid"),
    (FoodLiquid, "food_liquid"),
    (DutyFreeLiquidSteb, "duty_free_liquid_steb"),
    (AlcoholBeverage, "alcohol_beverage"),
    (AlcoholHighProof, "alcohol_high_proof"),
    (HandSanitizer, "hand_sanitizer"),
    // Flammables
    (FlammableLiquid, "flammable_liquid"),
    (FlammableSolid, "flammable_solid"),
    (LighterFluid, "lighter_fluid"),
    (PaintSolvent, "paint_solvent"),
    (AdhesiveSolvent, "adhesive_solvent"),
    (Lighter, "lighter"),
    (TorchLighter, "torch_lighter"),
    (Matches, "matches"),
    // Compressed gases
    (Co2CartridgeSmall, "co2_cartridge_small"),
    (MedicalOxygenCylinder, "medical_oxygen_cylinder"),
    (CampingGas, "camping_gas"),
    (ButaneCanister, "butane_canister"),
    (LifeVestCartridge, "life_vest_cartridge"),
    // Dry ice
    (DryIce, "dry_ice"),
    // Blades and sharp objects
    (Knife, "knife"),
    (Scissors, "scissors"),
    (MultiTool, "multi_tool"),
    (BoxCutter, "box_cutter"),
    (RazorBlade, "razor_blade"),
    (Sword, "sword"),
    (IceAxe, "ice_axe"),
    // Weapons and self-defense items
    (Firearm, "firearm"),
    (Ammunition, "ammunition"),
    (ReplicaWeapon, "replica_weapon"),
    (StunGun, "stun_gun"),
    (PepperSpray, "pepper_spray"),
    (ExpandableBaton, "expandable_baton"),
    (MartialArtsWeapon, "martial_arts_weapon"),
    // Sporting goods and tools
    (BaseballBat, "baseball_bat"),
    (GolfClub, "golf_club"),
    (HikingPole, "hiking_pole"),
    (PowerDrill, "power_drill"),
    (Saw, "saw"),
    (Crowbar, "crowbar"),
    // Corrosives
    (CorrosiveCleaner, "corrosive_cleaner"),
    (DrainCleaner, "drain_cleaner"),
    (Bleach, "bleach"),
    (MercuryDevice, "mercury_device"),
    // Everything else with a dangerous-goods angle
    (StrongMagnet, "strong_magnet"),
    (RadioactiveMaterial, "radioactive_material"),
    (InfectiousSubstance, "infectious_substance"),
    (Fireworks, "fireworks"),
    (SignalFlare, "signal_flare"),
    (ECigarette, "e_cigarette"),
    (AvalanchePack, "avalanche_pack"),
    (EngineEquipment, "engine_equipment"),
    (FuelCell, "fuel_cell"),
    // Sentinel for items outside the risk set
    (BenignGeneral, "benign_general"),
}

impl Canonical {
    pub fn is_benign(&self) -> bool {
        matches!(self, Canonical::BenignGeneral)
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantitative item attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamName {
    VolumeMl,
    Wh,
    Count,
    WeightKg,
    AbvPercent,
    BladeLengthCm,
}

impl ParamName {
    pub const ALL: &'static [ParamName] = &[
        ParamName::VolumeMl,
        ParamName::Wh,
        ParamName::Count,
        ParamName::WeightKg,
        ParamName::AbvPercent,
        ParamName::BladeLengthCm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamName::VolumeMl => "volume_ml",
            ParamName::Wh => "wh",
            ParamName::Count => "count",
            ParamName::WeightKg => "weight_kg",
            ParamName::AbvPercent => "abv_percent",
            ParamName::BladeLengthCm => "blade_length_cm",
        }
    }

    pub fn from_key(key: &str) -> Option<ParamName> {
        match key {
            "volume_ml" => Some(ParamName::VolumeMl),
            "wh" => Some(ParamName::Wh),
            "count" => Some(ParamName::Count),
            "weight_kg" => Some(ParamName::WeightKg),
            "abv_percent" => Some(ParamName::AbvPercent),
            "blade_length_cm" => Some(ParamName::BladeLengthCm),
            _ => None,
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule layer a regulation record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Airline,
    Country,
    International,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Airline => "airline",
            Scope::Country => "country",
            Scope::International => "international",
        }
    }
}

/// Authority tier of a rule: advisory, conditional, or prohibition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Block,
}

/// Domestic vs international routing, inferred from airport country codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Domestic,
    International,
}

/// Cabin class of a flight segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    Economy,
    Business,
    First,
    Prestige,
}

/// Which bag a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BagTarget {
    CarryOn,
    Checked,
    #[default]
    Both,
}

/// Per-bag decision value. Ordering is the merge lattice:
/// `Allow < Limit < Deny`, and `Deny` is monotone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Allow,
    Limit,
    Deny,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Allow => "allow",
            VerdictStatus::Limit => "limit",
            VerdictStatus::Deny => "deny",
        }
    }
}

/// Constraint block of a regulation rule.
///
/// The three condition fields participate in rule matching and
/// specificity; the remaining fields are caps evaluated against the
/// extracted item parameters. Unrecognized keys are preserved verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_type: Option<RouteType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin_class: Option<CabinClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<BagTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_volume_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blade_length_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_abv_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_abv_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pieces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_steb: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Constraints {
    /// Specificity is the count of non-null condition fields.
    pub fn specificity(&self) -> u8 {
        self.route_type.is_some() as u8
            + self.cabin_class.is_some() as u8
            + self.fare_class.is_some() as u8
    }

    pub fn applies_to(&self) -> BagTarget {
        self.applies_to.unwrap_or_default()
    }
}

/// Immutable regulation record as it appears inside a rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationRule {
    pub item_category: Canonical,
    pub constraints: Constraints,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// On-disk regulation file: one file per scope+code.
#[derive(Debug, Clone, Deserialize)]
pub struct RegulationFile {
    pub scope: Scope,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub rules: Vec<RegulationRule>,
}

/// Errors raised by the decision core.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{path}: {detail}")]
    Data { path: String, detail: String },

    #[error("{path}: rule {index} collides with an earlier rule under the same key without a distinguishing condition vector")]
    DuplicateRule { path: String, index: usize },

    #[error("taxonomy error: {0}")]
    Taxonomy(String),
}
