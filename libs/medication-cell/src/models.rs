use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared_backend::Resource;
use shared_models::display;
use shared_models::form::{FieldError, FormMode, ModalForm};
use shared_models::listing::TableRow;
use shared_utils::forms::{self, FieldErrors};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MedicationType {
    Antibiotic,
    Analgesic,
    AntiInflammatory,
    Antihistamine,
    Antidepressant,
    Antihypertensive,
    Antidiabetic,
    Diuretic,
    Steroid,
    Vaccine,
    Vitamin,
    Anticonvulsant,
    Antipsychotic,
    Anticoagulant,
    Bronchodilator,
    Sedative,
    Laxative,
    Antacid,
    Antiviral,
    Antifungal,
    Other,
}

impl MedicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationType::Antibiotic => "ANTIBIOTIC",
            MedicationType::Analgesic => "ANALGESIC",
            MedicationType::AntiInflammatory => "ANTI_INFLAMMATORY",
            MedicationType::Antihistamine => "ANTIHISTAMINE",
            MedicationType::Antidepressant => "ANTIDEPRESSANT",
            MedicationType::Antihypertensive => "ANTIHYPERTENSIVE",
            MedicationType::Antidiabetic => "ANTIDIABETIC",
            MedicationType::Diuretic => "DIURETIC",
            MedicationType::Steroid => "STEROID",
            MedicationType::Vaccine => "VACCINE",
            MedicationType::Vitamin => "VITAMIN",
            MedicationType::Anticonvulsant => "ANTICONVULSANT",
            MedicationType::Antipsychotic => "ANTIPSYCHOTIC",
            MedicationType::Anticoagulant => "ANTICOAGULANT",
            MedicationType::Bronchodilator => "BRONCHODILATOR",
            MedicationType::Sedative => "SEDATIVE",
            MedicationType::Laxative => "LAXATIVE",
            MedicationType::Antacid => "ANTACID",
            MedicationType::Antiviral => "ANTIVIRAL",
            MedicationType::Antifungal => "ANTIFUNGAL",
            MedicationType::Other => "OTHER",
        }
    }
}

impl fmt::Display for MedicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DosageUnit {
    Mg,
    Ml,
    G,
    Mcg,
    Percent,
    Iu,
    Meq,
    Unit,
    Other,
}

impl DosageUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageUnit::Mg => "MG",
            DosageUnit::Ml => "ML",
            DosageUnit::G => "G",
            DosageUnit::Mcg => "MCG",
            DosageUnit::Percent => "PERCENT",
            DosageUnit::Iu => "IU",
            DosageUnit::Meq => "MEQ",
            DosageUnit::Unit => "UNIT",
            DosageUnit::Other => "OTHER",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            DosageUnit::Percent => "%",
            DosageUnit::Mg => "mg",
            DosageUnit::Ml => "ml",
            DosageUnit::G => "g",
            DosageUnit::Mcg => "mcg",
            DosageUnit::Iu => "IU",
            DosageUnit::Meq => "mEq",
            DosageUnit::Unit => "units",
            DosageUnit::Other => "",
        }
    }
}

impl fmt::Display for DosageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub medication_id: i64,
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub medication_type: Option<MedicationType>,
    pub description: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub dosage_unit: Option<DosageUnit>,
    pub side_effects: Option<String>,
    pub contraindications: Option<String>,
    pub storage: Option<String>,
    pub requires_prescription: Option<bool>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub batch_number: Option<String>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default, with = "shared_models::lenient::date")]
    pub expiry_date: Option<NaiveDate>,
    pub barcode: Option<String>,
    pub is_active: Option<bool>,
    pub is_expired: Option<bool>,
    is_low_stock: Option<bool>,
    pub days_until_expiry: Option<i64>,
}

impl Medication {
    /// The backend's flag when it sent one, otherwise stock at or below the
    /// reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.is_low_stock.unwrap_or_else(|| match (self.stock_quantity, self.reorder_level) {
            (Some(stock), Some(level)) => stock <= level,
            _ => false,
        })
    }

    pub fn strength_label(&self) -> String {
        match (self.strength.as_deref().map(str::trim), self.dosage_unit) {
            (Some(strength), Some(unit)) if !strength.is_empty() => format!("{}{}", strength, unit.symbol()),
            (Some(strength), None) if !strength.is_empty() => strength.to_string(),
            _ => display::MISSING.to_string(),
        }
    }
}

impl Resource for Medication {
    const COLLECTION: &'static str = "medications";
    const LABEL: &'static str = "Medication";
}

impl TableRow for Medication {
    fn columns() -> &'static [&'static str] {
        &["Name", "Generic Name", "Type", "Strength", "Stock", "Price", "Prescription", "Expires"]
    }

    fn cells(&self) -> Vec<String> {
        let stock = display::value(self.stock_quantity);
        vec![
            display::text(self.name.as_deref()),
            display::text(self.generic_name.as_deref()),
            display::value(self.medication_type),
            self.strength_label(),
            if self.is_low_stock() { format!("{} (low)", stock) } else { stock },
            display::money(self.price),
            display::flag(self.requires_prescription),
            display::date(self.expiry_date),
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicationListQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub medication_type: Option<String>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub low_stock: Option<bool>,
    #[serde(default, deserialize_with = "shared_models::query::optional")]
    pub requires_prescription: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockAction {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub quantity: i32,
    pub action: StockAction,
}

impl StockAdjustment {
    /// Signed change the backend applies to the stock.
    pub fn delta(&self) -> i32 {
        match self.action {
            StockAction::Add => self.quantity,
            StockAction::Subtract => -self.quantity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationForm {
    pub name: String,
    pub generic_name: String,
    pub brand: String,
    pub manufacturer: String,
    #[serde(rename = "type")]
    pub medication_type: String,
    pub description: String,
    pub dosage_form: String,
    pub strength: String,
    pub dosage_unit: String,
    pub side_effects: String,
    pub contraindications: String,
    pub storage: String,
    pub requires_prescription: bool,
    pub price: String,
    pub stock_quantity: String,
    pub reorder_level: String,
    pub batch_number: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub barcode: String,
    pub is_active: bool,
}

impl ModalForm for MedicationForm {
    type Entity = Medication;
    const LABEL: &'static str = "Medication";

    fn blank() -> Self {
        Self {
            medication_type: MedicationType::Other.to_string(),
            dosage_unit: DosageUnit::Mg.to_string(),
            requires_prescription: true,
            stock_quantity: "0".to_string(),
            reorder_level: "10".to_string(),
            is_active: true,
            ..Self::default()
        }
    }

    fn from_entity(medication: &Medication) -> Self {
        Self {
            name: forms::form_text(medication.name.as_deref()),
            generic_name: forms::form_text(medication.generic_name.as_deref()),
            brand: forms::form_text(medication.brand.as_deref()),
            manufacturer: forms::form_text(medication.manufacturer.as_deref()),
            medication_type: forms::form_number(medication.medication_type),
            description: forms::form_text(medication.description.as_deref()),
            dosage_form: forms::form_text(medication.dosage_form.as_deref()),
            strength: forms::form_text(medication.strength.as_deref()),
            dosage_unit: forms::form_number(medication.dosage_unit),
            side_effects: forms::form_text(medication.side_effects.as_deref()),
            contraindications: forms::form_text(medication.contraindications.as_deref()),
            storage: forms::form_text(medication.storage.as_deref()),
            requires_prescription: medication.requires_prescription.unwrap_or(false),
            price: forms::form_number(medication.price),
            stock_quantity: forms::form_number(medication.stock_quantity),
            reorder_level: forms::form_number(medication.reorder_level),
            batch_number: forms::form_text(medication.batch_number.as_deref()),
            manufacture_date: forms::form_date(medication.manufacture_date),
            expiry_date: forms::form_date(medication.expiry_date),
            barcode: forms::form_text(medication.barcode.as_deref()),
            is_active: medication.is_active.unwrap_or(true),
        }
    }

    fn validate(&self, _mode: FormMode) -> Vec<FieldError> {
        let mut errors = FieldErrors::new();

        errors
            .require("name", &self.name, "Medication name")
            .require("type", &self.medication_type, "Type");

        errors.check(forms::parse_choice_field::<MedicationType>("type", &self.medication_type, "Select a medication type"));
        errors.check(forms::parse_choice_field::<DosageUnit>("dosageUnit", &self.dosage_unit, "Select a dosage unit"));

        if let Some(Some(price)) = errors.check(forms::parse_number_field::<f64>("price", &self.price)) {
            if price < 0.0 {
                errors.push("price", "Price cannot be negative");
            }
        }
        for (field, raw) in [("stockQuantity", &self.stock_quantity), ("reorderLevel", &self.reorder_level)] {
            if let Some(Some(count)) = errors.check(forms::parse_number_field::<i32>(field, raw)) {
                if count < 0 {
                    errors.push(field, "Cannot be negative");
                }
            }
        }

        let made = errors.check(forms::parse_date_field("manufactureDate", &self.manufacture_date));
        let expires = errors.check(forms::parse_date_field("expiryDate", &self.expiry_date));
        if let (Some(Some(made)), Some(Some(expires))) = (made, expires) {
            if expires <= made {
                errors.push("expiryDate", "Expiry date must be after the manufacture date");
            }
        }

        errors.into_vec()
    }

    fn into_payload(self, _mode: FormMode) -> Value {
        let medication_type = forms::parse_choice_field::<MedicationType>("type", &self.medication_type, "")
            .ok()
            .flatten();
        let dosage_unit = forms::parse_choice_field::<DosageUnit>("dosageUnit", &self.dosage_unit, "")
            .ok()
            .flatten();

        json!({
            "name": self.name.trim(),
            "genericName": forms::blank_to_none(&self.generic_name),
            "brand": forms::blank_to_none(&self.brand),
            "manufacturer": forms::blank_to_none(&self.manufacturer),
            "type": medication_type,
            "description": forms::blank_to_none(&self.description),
            "dosageForm": forms::blank_to_none(&self.dosage_form),
            "strength": forms::blank_to_none(&self.strength),
            "dosageUnit": dosage_unit,
            "sideEffects": forms::blank_to_none(&self.side_effects),
            "contraindications": forms::blank_to_none(&self.contraindications),
            "storage": forms::blank_to_none(&self.storage),
            "requiresPrescription": self.requires_prescription,
            "price": forms::parse_number_field::<f64>("price", &self.price).ok().flatten(),
            "stockQuantity": forms::parse_number_field::<i32>("stockQuantity", &self.stock_quantity).ok().flatten().unwrap_or(0),
            "reorderLevel": forms::parse_number_field::<i32>("reorderLevel", &self.reorder_level).ok().flatten(),
            "batchNumber": forms::blank_to_none(&self.batch_number),
            "manufactureDate": forms::iso_date(&self.manufacture_date),
            "expiryDate": forms::iso_date(&self.expiry_date),
            "barcode": forms::blank_to_none(&self.barcode),
            "isActive": self.is_active,
        })
    }
}
