pub mod canteen_data_types;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Student,
    Employee,
    Other,
}

impl PriceTier {
    /// Role attribute used by OpenMensa `<price>` elements.
    pub fn as_role(&self) -> &'static str {
        match self {
            PriceTier::Student => "student",
            PriceTier::Employee => "employee",
            PriceTier::Other => "other",
        }
    }
}

pub type Prices = BTreeMap<PriceTier, f64>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Meal {
    pub category: String,
    pub name: String,
    pub notes: Vec<String>,
    pub prices: Prices,
    pub allergens: Vec<String>,
}

/// Menu of a single canteen for a single day.
///
/// `closed` is derived from `meals`, there is no "open but empty" day.
/// Construct through [`DayMenu::new`] or [`DayMenu::closed`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DayMenu {
    pub day: NaiveDate,
    pub meals: Vec<Meal>,
    pub closed: bool,
}

impl DayMenu {
    pub fn new(day: NaiveDate, meals: Vec<Meal>) -> Self {
        let closed = meals.is_empty();
        DayMenu { day, meals, closed }
    }

    pub fn closed(day: NaiveDate) -> Self {
        DayMenu::new(day, Vec::new())
    }
}
