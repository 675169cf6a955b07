use log::debug;

use crate::ontology::{
    ActionPlan, Entities, EntityField, IntentClassifierResult, RateParameters,
    ServiceabilityParameters,
};

/// Intent names understood by the decision rules.
pub const CHECK_RATE: &str = "CHECK_RATE";
pub const CHECK_SERVICEABILITY: &str = "CHECK_SERVICEABILITY";
pub const BOOK_PICKUP: &str = "BOOK_PICKUP";
pub const TRACK_ORDER: &str = "TRACK_ORDER";
pub const CANCEL_ORDER: &str = "CANCEL_ORDER";
pub const RESCHEDULE_PICKUP: &str = "RESCHEDULE_PICKUP";
pub const RAISE_COMPLAINT: &str = "RAISE_COMPLAINT";
pub const CONNECT_TO_AGENT: &str = "CONNECT_TO_AGENT";
pub const PAYMENT_QUERY: &str = "PAYMENT_QUERY";
pub const DOCUMENT_UPLOAD_QUERY: &str = "DOCUMENT_UPLOAD_QUERY";

/// Rule based decision engine mapping a classified intent and the extracted
/// entities to the next system action.
///
/// Confidence is carried in the classification result but does not gate the
/// rules: an intent with no matching rule falls through to
/// [`ActionPlan::Unknown`].
#[derive(Debug, Default)]
pub struct ActionDecider;

impl ActionDecider {
    pub fn new() -> Self {
        Self
    }

    /// Required fields for the given intent; empty for intents that need no
    /// entity to proceed.
    fn required_fields(intent: &str) -> &'static [EntityField] {
        match intent {
            CHECK_RATE => &[
                EntityField::PickupLocation,
                EntityField::DropLocation,
                EntityField::WeightKg,
            ],
            CHECK_SERVICEABILITY => &[EntityField::DropLocation],
            BOOK_PICKUP => &[
                EntityField::PickupLocation,
                EntityField::DropLocation,
                EntityField::Packages,
            ],
            RESCHEDULE_PICKUP => &[EntityField::PickupTime],
            _ => &[],
        }
    }

    /// Names of the required fields missing from `entities`.
    pub fn find_missing_fields(&self, intent: &str, entities: &Entities) -> Vec<String> {
        Self::required_fields(intent)
            .iter()
            .filter(|field| !entities.contains(**field))
            .map(|field| field.identifier().to_string())
            .collect()
    }

    pub fn decide_action(
        &self,
        intent_result: &IntentClassifierResult,
        entities: &Entities,
    ) -> ActionPlan {
        let intent = match intent_result.intent_name.as_ref() {
            Some(intent) => intent.as_str(),
            None => {
                return unknown_action(None);
            }
        };
        debug!("Deciding action for intent '{}'", intent);
        let missing_fields = self.find_missing_fields(intent, entities);

        match intent {
            CHECK_RATE => {
                if !missing_fields.is_empty() {
                    ask_missing_fields(missing_fields)
                } else {
                    ActionPlan::CalculateRate {
                        message: "Fetching rate information...".to_string(),
                        api_call: "pricing_api".to_string(),
                        parameters: RateParameters {
                            from: entities.pickup_location.clone().unwrap_or_default(),
                            to: entities.drop_location.clone().unwrap_or_default(),
                            weight: entities.weight_kg.unwrap_or_default(),
                        },
                    }
                }
            }
            CHECK_SERVICEABILITY => {
                if !missing_fields.is_empty() {
                    ask_missing_fields(missing_fields)
                } else {
                    ActionPlan::CheckServiceArea {
                        message: "Checking serviceability...".to_string(),
                        api_call: "serviceability_api".to_string(),
                        parameters: ServiceabilityParameters {
                            location: entities.drop_location.clone().unwrap_or_default(),
                        },
                    }
                }
            }
            BOOK_PICKUP => {
                if !missing_fields.is_empty() {
                    return ask_missing_fields(missing_fields);
                }
                let mut recommended: Vec<String> = vec![];
                if entities.pickup_time.is_none() {
                    recommended.push(EntityField::PickupTime.identifier().to_string());
                }
                if entities.phone_number.is_none() {
                    recommended.push(EntityField::PhoneNumber.identifier().to_string());
                }
                if !recommended.is_empty() {
                    ActionPlan::AskOptionalFields {
                        message: format!(
                            "I can book your pickup. Would you like to specify {}?",
                            recommended.join(", ")
                        ),
                        optional_fields: recommended,
                        can_proceed: true,
                    }
                } else {
                    ActionPlan::CreateBooking {
                        message: "Creating your pickup booking...".to_string(),
                        api_call: "booking_api".to_string(),
                        parameters: entities.clone(),
                    }
                }
            }
            TRACK_ORDER => ActionPlan::AskTrackingInfo {
                message: "Please provide your AWB number or order ID to track".to_string(),
                required_info: "awb_number".to_string(),
            },
            CANCEL_ORDER => ActionPlan::AskOrderId {
                message: "Please provide your order ID or AWB number to cancel".to_string(),
                required_info: Some("order_id".to_string()),
                new_time: None,
            },
            RESCHEDULE_PICKUP => {
                if !missing_fields.is_empty() {
                    ActionPlan::AskMissingFields {
                        missing_fields,
                        message: "When would you like to reschedule the pickup?".to_string(),
                    }
                } else {
                    ActionPlan::AskOrderId {
                        message: "Please provide your booking ID to reschedule".to_string(),
                        required_info: None,
                        new_time: entities.pickup_time.clone(),
                    }
                }
            }
            RAISE_COMPLAINT => ActionPlan::CreateTicket {
                message: "I will create a complaint ticket. Please describe your issue."
                    .to_string(),
                ticket_type: "complaint".to_string(),
                contact: entities.phone_number.clone(),
            },
            CONNECT_TO_AGENT => ActionPlan::TransferToAgent {
                message: "Connecting you to a customer service agent...".to_string(),
                priority: "normal".to_string(),
            },
            PAYMENT_QUERY => ActionPlan::ProvidePaymentInfo {
                message: "We accept COD, UPI, cards, and online payment. Which option would \
                          you prefer?"
                    .to_string(),
                available_modes: vec![
                    "COD".to_string(),
                    "UPI".to_string(),
                    "Card".to_string(),
                    "Net Banking".to_string(),
                ],
            },
            DOCUMENT_UPLOAD_QUERY => ActionPlan::ProvideUploadLink {
                message: "You can upload documents through our portal or app. What document \
                          do you need to upload?"
                    .to_string(),
                upload_options: vec![
                    "Invoice".to_string(),
                    "KYC".to_string(),
                    "GST Certificate".to_string(),
                    "ID Proof".to_string(),
                ],
            },
            other => unknown_action(Some(other.to_string())),
        }
    }
}

fn unknown_action(intent: Option<String>) -> ActionPlan {
    ActionPlan::Unknown {
        message: "I am not sure how to help with that. Please contact customer support."
            .to_string(),
        intent,
    }
}

fn ask_missing_fields(missing_fields: Vec<String>) -> ActionPlan {
    let message = missing_fields_message(&missing_fields);
    ActionPlan::AskMissingFields {
        missing_fields,
        message,
    }
}

/// User facing message listing the missing fields by their readable names.
fn missing_fields_message(missing_fields: &[String]) -> String {
    let readable_fields: Vec<&str> = missing_fields
        .iter()
        .map(|field| readable_field_name(field))
        .collect();
    match readable_fields.len() {
        1 => format!("Please provide {}.", readable_fields[0]),
        _ => format!(
            "Please provide {} and {}.",
            readable_fields[..readable_fields.len() - 1].join(", "),
            readable_fields[readable_fields.len() - 1]
        ),
    }
}

fn readable_field_name(identifier: &str) -> &str {
    match identifier {
        "pickup_location" => EntityField::PickupLocation.readable_name(),
        "drop_location" => EntityField::DropLocation.readable_name(),
        "weight_kg" => EntityField::WeightKg.readable_name(),
        "packages" => EntityField::Packages.readable_name(),
        "pickup_time" => EntityField::PickupTime.readable_name(),
        "phone_number" => EntityField::PhoneNumber.readable_name(),
        other => other,
    }
}
