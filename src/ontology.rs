use serde::{Deserialize, Serialize};

use crate::utils::IntentName;

/// Result of the intent classification step.
///
/// `intent_name` is `None` when no intent could be inferred for the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassifierResult {
    #[serde(rename = "intent")]
    pub intent_name: Option<IntentName>,
    #[serde(rename = "confidence")]
    pub confidence_score: f32,
}

/// Payment modes understood by the logistics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "prepaid")]
    Prepaid,
}

/// Structured values extracted from a single query.
///
/// Field names match the wire format of the voice-agent API: absent values
/// are serialized as `null`, `fragile` is always present as a boolean.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entities {
    pub pickup_location: Option<String>,
    pub drop_location: Option<String>,
    pub weight_kg: Option<f64>,
    pub packages: Option<u32>,
    pub pickup_time: Option<String>,
    pub fragile: bool,
    pub payment_mode: Option<PaymentMode>,
    pub phone_number: Option<String>,
}

/// Entity fields the action decider can require or recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityField {
    PickupLocation,
    DropLocation,
    WeightKg,
    Packages,
    PickupTime,
    PhoneNumber,
}

impl EntityField {
    /// Wire name of the field, as used in `missing_fields` lists.
    pub fn identifier(&self) -> &'static str {
        match *self {
            EntityField::PickupLocation => "pickup_location",
            EntityField::DropLocation => "drop_location",
            EntityField::WeightKg => "weight_kg",
            EntityField::Packages => "packages",
            EntityField::PickupTime => "pickup_time",
            EntityField::PhoneNumber => "phone_number",
        }
    }

    /// Human readable name, used when asking the user for missing fields.
    pub fn readable_name(&self) -> &'static str {
        match *self {
            EntityField::PickupLocation => "pickup location",
            EntityField::DropLocation => "delivery location",
            EntityField::WeightKg => "package weight (in kg)",
            EntityField::Packages => "number of packages",
            EntityField::PickupTime => "preferred pickup time",
            EntityField::PhoneNumber => "contact number",
        }
    }
}

impl Entities {
    /// Whether the given field holds a value.
    pub fn contains(&self, field: EntityField) -> bool {
        match field {
            EntityField::PickupLocation => self.pickup_location.is_some(),
            EntityField::DropLocation => self.drop_location.is_some(),
            EntityField::WeightKg => self.weight_kg.is_some(),
            EntityField::Packages => self.packages.is_some(),
            EntityField::PickupTime => self.pickup_time.is_some(),
            EntityField::PhoneNumber => self.phone_number.is_some(),
        }
    }
}

/// Parameters attached to a rate calculation action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateParameters {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// Parameters attached to a serviceability check action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceabilityParameters {
    pub location: String,
}

/// Next system action decided from the classified intent and the extracted
/// entities. Serializes to the `next_action` tagged wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "next_action")]
pub enum ActionPlan {
    #[serde(rename = "ASK_MISSING_FIELDS")]
    AskMissingFields {
        missing_fields: Vec<String>,
        message: String,
    },
    #[serde(rename = "CALCULATE_RATE")]
    CalculateRate {
        message: String,
        api_call: String,
        parameters: RateParameters,
    },
    #[serde(rename = "CHECK_SERVICE_AREA")]
    CheckServiceArea {
        message: String,
        api_call: String,
        parameters: ServiceabilityParameters,
    },
    #[serde(rename = "ASK_OPTIONAL_FIELDS")]
    AskOptionalFields {
        optional_fields: Vec<String>,
        message: String,
        can_proceed: bool,
    },
    #[serde(rename = "CREATE_BOOKING")]
    CreateBooking {
        message: String,
        api_call: String,
        parameters: Entities,
    },
    #[serde(rename = "ASK_TRACKING_INFO")]
    AskTrackingInfo {
        message: String,
        required_info: String,
    },
    #[serde(rename = "ASK_ORDER_ID")]
    AskOrderId {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        required_info: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_time: Option<String>,
    },
    #[serde(rename = "CREATE_TICKET")]
    CreateTicket {
        message: String,
        ticket_type: String,
        contact: Option<String>,
    },
    #[serde(rename = "TRANSFER_TO_AGENT")]
    TransferToAgent { message: String, priority: String },
    #[serde(rename = "PROVIDE_PAYMENT_INFO")]
    ProvidePaymentInfo {
        message: String,
        available_modes: Vec<String>,
    },
    #[serde(rename = "PROVIDE_UPLOAD_LINK")]
    ProvideUploadLink {
        message: String,
        upload_options: Vec<String>,
    },
    #[serde(rename = "UNKNOWN")]
    Unknown {
        message: String,
        intent: Option<String>,
    },
}

/// Full result of parsing a single query: the classified intent, the
/// extracted entities and the decided next action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub intent: IntentClassifierResult,
    pub entities: Entities,
    pub next_action: ActionPlan,
}
