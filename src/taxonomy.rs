//! Static naming tables shared by the aggregator and the EIA fetcher.
//!
//! Microsegment JSON keys are plain English ("natural gas", "water heating");
//! the AEO API addresses the same categories through short codes that are
//! stitched together into a series identifier.

use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuildingClass {
    Residential,
    Commercial,
}

const RESIDENTIAL_SUBTYPES: &[&str] = &["single family home", "multi family home", "mobile home"];

const COMMERCIAL_SUBTYPES: &[&str] = &[
    "assembly",
    "education",
    "food sales",
    "food service",
    "health care",
    "large office",
    "lodging",
    "mercantile/service",
    "other",
    "small office",
    "warehouse",
    "unspecified",
];

impl BuildingClass {
    pub fn api_code(self) -> &'static str {
        match self {
            Self::Residential => "resd",
            Self::Commercial => "comm",
        }
    }

    /// Building subtype keys that appear under this class in the microsegments.
    pub fn subtypes(self) -> &'static [&'static str] {
        match self {
            Self::Residential => RESIDENTIAL_SUBTYPES,
            Self::Commercial => COMMERCIAL_SUBTYPES,
        }
    }

    pub fn owns_subtype(self, building_type: &str) -> bool {
        self.subtypes().contains(&building_type)
    }

    /// Resolves a building subtype key back to its class.
    pub fn of_subtype(building_type: &str) -> Option<Self> {
        Self::iter().find(|class| class.owns_subtype(building_type))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display, AsRefStr,
)]
pub enum Fuel {
    #[strum(serialize = "electricity")]
    Electricity,
    #[strum(serialize = "natural gas")]
    NaturalGas,
    #[strum(serialize = "distillate")]
    Distillate,
    #[strum(serialize = "other fuel")]
    OtherFuel,
}

impl Fuel {
    /// Commercial electricity is published as "Purchased Electricity" (`prc`).
    pub fn api_code(self, class: BuildingClass) -> &'static str {
        match (self, class) {
            (Self::Electricity, BuildingClass::Residential) => "elc",
            (Self::Electricity, BuildingClass::Commercial) => "prc",
            (Self::NaturalGas, _) => "ng",
            (Self::Distillate, _) => "dfo",
            (Self::OtherFuel, _) => "ofu",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display, AsRefStr,
)]
pub enum EndUse {
    #[strum(serialize = "clothes washing")]
    ClothesWashing,
    #[strum(serialize = "drying")]
    Drying,
    #[strum(serialize = "computers")]
    Computers,
    #[strum(serialize = "cooking")]
    Cooking,
    #[strum(serialize = "dishwasher")]
    Dishwasher,
    #[strum(serialize = "fans and pumps")]
    FansAndPumps,
    #[strum(serialize = "freezers")]
    Freezers,
    #[strum(serialize = "lighting")]
    Lighting,
    #[strum(serialize = "non-PC office equipment")]
    NonPcOfficeEquipment,
    #[strum(serialize = "PCs")]
    Pcs,
    #[strum(serialize = "other")]
    Other,
    #[strum(serialize = "refrigeration")]
    Refrigeration,
    #[strum(serialize = "cooling")]
    Cooling,
    #[strum(serialize = "heating")]
    Heating,
    #[strum(serialize = "TVs")]
    Tvs,
    #[strum(serialize = "unspecified")]
    Unspecified,
    #[strum(serialize = "ventilation")]
    Ventilation,
    #[strum(serialize = "water heating")]
    WaterHeating,
}

impl EndUse {
    pub fn api_code(self) -> &'static str {
        match self {
            Self::ClothesWashing => "clw",
            Self::Drying => "cdr",
            Self::Computers => "cmpr",
            Self::Cooking => "cgr",
            Self::Dishwasher => "dsw",
            Self::FansAndPumps => "fpr",
            Self::Freezers => "frz",
            Self::Lighting => "lghtng",
            Self::NonPcOfficeEquipment => "otheqpnpc",
            Self::Pcs => "otheqppc",
            Self::Other => "othu",
            Self::Refrigeration => "refr",
            Self::Cooling => "spc",
            Self::Heating => "sph",
            Self::Tvs => "tvr",
            Self::Unspecified => "uns",
            Self::Ventilation => "vntc",
            Self::WaterHeating => "wtht",
        }
    }
}

// --- Leaf roll-up lists ---

/// Sub-keys of the residential "other" bucket that report as `other`.
pub const OTHER_END_USES: &[&str] = &[
    "rechargeables",
    "coffee maker",
    "dehumidifier",
    "electric other",
    "small kitchen appliances",
    "microwave",
    "smartphones",
    "pool heaters",
    "pool pumps",
    "security system",
    "portable electric spas",
    "smart speakers",
    "tablets",
    "wine coolers",
    "other appliances",
];

/// Sub-keys of the "other" bucket that AEO publishes as end uses of their own.
pub const SEPARATE_OTHER_END_USES: &[&str] = &["clothes washing", "freezers", "dishwasher"];

pub const HEATING_END_USES: &[&str] = &["heating", "secondary heating"];

/// End-use keys that map one-to-one onto an AEO end use.
/// "onsite generation" has no AEO consumption series and never matches a filter.
pub const REMAINING_END_USES: &[&str] = &[
    "drying",
    "computers",
    "cooking",
    "lighting",
    "PCs",
    "onsite generation",
    "non-PC office equipment",
    "refrigeration",
    "TVs",
    "ventilation",
    "water heating",
];

/// One comparison unit: a (building class, fuel, end use) selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey {
    pub class: BuildingClass,
    pub fuel: Fuel,
    pub end_use: EndUse,
}

impl FilterKey {
    pub fn new(class: BuildingClass, fuel: Fuel, end_use: EndUse) -> Self {
        Self {
            class,
            fuel,
            end_use,
        }
    }

    /// Every combination, in run order: class, then fuel, then end use.
    pub fn all() -> impl Iterator<Item = FilterKey> {
        BuildingClass::iter().flat_map(|class| {
            Fuel::iter().flat_map(move |fuel| {
                EndUse::iter().map(move |end_use| FilterKey::new(class, fuel, end_use))
            })
        })
    }

    /// AEO consumption series id, e.g. `cnsm_NA_resd_lghtng_elc_NA_usa_qbtu`.
    pub fn series_id(&self) -> String {
        let (end_use_res, end_use_com, heat_tag) = match self.class {
            BuildingClass::Residential => {
                let tag = if self.end_use == EndUse::Heating && self.fuel == Fuel::Electricity {
                    "hhd"
                } else {
                    "NA"
                };
                (self.end_use.api_code(), "NA", tag)
            }
            BuildingClass::Commercial => ("NA", self.end_use.api_code(), "NA"),
        };

        format!(
            "cnsm_{}_{}_{}_{}_{}_usa_qbtu",
            heat_tag,
            self.class.api_code(),
            end_use_res,
            self.fuel.api_code(self.class),
            end_use_com
        )
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.class, self.fuel, self.end_use)
    }
}
