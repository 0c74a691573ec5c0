use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use shared_backend::{with_query, AppState, BackendClient, Resource};
use shared_models::error::AppError;
use shared_models::form::{FormMode, ModalForm};
use shared_models::listing::ListResponse;
use shared_utils::filter::{matches_eq, matches_search, parse_choice};

use crate::models::{Medication, MedicationForm, MedicationListQuery, MedicationType, StockAction, StockAdjustment};

pub struct MedicationService {
    backend: BackendClient,
}

impl MedicationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }

    pub async fn fetch_medications(&self, auth_token: &str) -> Result<Vec<Medication>, AppError> {
        debug!("Fetching medication catalogue");
        Ok(self.backend.list::<Medication>(auth_token).await?)
    }

    pub async fn list_medications(
        &self,
        query: &MedicationListQuery,
        auth_token: &str,
    ) -> Result<ListResponse<Medication>, AppError> {
        let medication_type = parse_choice::<MedicationType>("medication type", query.medication_type.as_deref())?;
        let medications = self.fetch_medications(auth_token).await?;

        Ok(ListResponse::filtered(medications, |m| {
            matches_search(
                query.search.as_deref(),
                &[m.name.as_deref(), m.generic_name.as_deref(), m.brand.as_deref()],
            ) && (medication_type.is_none() || m.medication_type == medication_type)
                && matches_eq(Some(&m.is_low_stock()), query.low_stock.as_ref())
                && matches_eq(m.requires_prescription.as_ref(), query.requires_prescription.as_ref())
        }))
    }

    pub async fn get_medication(&self, medication_id: i64, auth_token: &str) -> Result<Medication, AppError> {
        debug!("Fetching medication {}", medication_id);
        Ok(self
            .backend
            .get_one::<Medication>(&medication_id.to_string(), auth_token)
            .await?)
    }

    pub async fn create_medication(&self, form: MedicationForm, auth_token: &str) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Add)?;
        info!("Adding medication {}", payload["name"]);
        Ok(self.backend.create::<Medication>(payload, auth_token).await?)
    }

    pub async fn update_medication(
        &self,
        medication_id: i64,
        form: MedicationForm,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        let payload = form.into_checked_payload(FormMode::Edit)?;
        debug!("Updating medication {}", medication_id);
        Ok(self
            .backend
            .update::<Medication>(&medication_id.to_string(), payload, auth_token)
            .await?)
    }

    /// Applies a stock movement as a signed delta. Removing more than the
    /// stock on hand is refused locally.
    pub async fn adjust_stock(
        &self,
        medication_id: i64,
        adjustment: StockAdjustment,
        auth_token: &str,
    ) -> Result<Value, AppError> {
        if adjustment.quantity <= 0 {
            return Err(AppError::invalid_field("quantity", "Quantity must be greater than zero"));
        }

        if adjustment.action == StockAction::Subtract {
            let medication = self.get_medication(medication_id, auth_token).await?;
            match medication.stock_quantity {
                Some(stock) if stock < adjustment.quantity => {
                    return Err(AppError::invalid_field(
                        "quantity",
                        format!("Only {} units in stock", stock),
                    ));
                }
                Some(_) => {}
                None => warn!("Medication {} has no recorded stock, leaving the check to the backend", medication_id),
            }
        }

        let delta = adjustment.delta().to_string();
        let path = with_query(
            &format!("{}/{}/stock", Medication::COLLECTION, medication_id),
            &[("quantity", delta.as_str())],
        );
        info!("Adjusting stock of medication {} by {}", medication_id, delta);

        let updated = self.backend.send(Method::PUT, &path, Some(auth_token), None).await?;
        Ok(updated.unwrap_or_default())
    }

    pub async fn delete_medication(&self, medication_id: i64, auth_token: &str) -> Result<(), AppError> {
        debug!("Deleting medication {}", medication_id);
        Ok(self
            .backend
            .remove::<Medication>(&medication_id.to_string(), auth_token)
            .await?)
    }
}
