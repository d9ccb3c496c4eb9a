//! Wire DTOs for the transfer endpoints.

use serde::{Deserialize, Serialize};

use card2card_common::{Currency, Pan};
use card2card_engine::TransferRequest;

/// Body of `POST /transfer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDto {
    pub card_from_number: String,
    /// Card expiry in MMYY.
    pub card_from_valid_till: String,
    #[serde(rename = "cardFromCVV")]
    pub card_from_cvv: String,
    pub card_to_number: String,
    pub amount: AmountDto,
}

/// Amount with currency, nested as the wire format nests it.
#[derive(Debug, Clone, Deserialize)]
pub struct AmountDto {
    pub value: i64,
    pub currency: String,
}

impl TransferDto {
    /// Convert into an engine request. Call only after validation.
    pub fn into_request(self) -> TransferRequest {
        TransferRequest {
            source: Pan::new(self.card_from_number),
            destination: Pan::new(self.card_to_number),
            amount: self.amount.value,
            currency: Currency::new(self.amount.currency),
        }
    }
}

/// Body of `POST /confirmOperation`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDto {
    pub operation_id: String,
    pub action: String,
}

/// Success body for both endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDto {
    pub operation_id: String,
}

/// Error body: a human-readable message plus the numeric code.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub message: String,
    pub id: u16,
}
