use crate::agent::{ToolKind, ToolSpec};
use crate::bookings::{
    BOOKING_STATUS_CONFIRMED, BookingRecord, BookingType, Customer, generate_reference,
};
use crate::tools::ToolResult;
use crate::traits::BookingStore;
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Deserialize)]
struct BookingArgs {
    booking_type: String,
    booking_details: Value,
    customer_name: String,
    customer_email: String,
}

pub struct CreateBookingTool {
    store: Arc<dyn BookingStore>,
    sequence: AtomicU64,
}

impl CreateBookingTool {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec {
            kind: ToolKind::CreateBooking,
            name: ToolKind::CreateBooking.name().to_string(),
            description: "Create a confirmed booking for a flight or hotel".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "booking_type": {
                        "type": "string",
                        "description": "Either 'flight' or 'hotel'"
                    },
                    "booking_details": {
                        "type": "object",
                        "description": "Details of the selected flight or hotel; a plain-text description is also accepted"
                    },
                    "customer_name": {
                        "type": "string",
                        "description": "Customer's full name"
                    },
                    "customer_email": {
                        "type": "string",
                        "description": "Customer's email address"
                    }
                },
                "required": ["booking_type", "booking_details", "customer_name", "customer_email"]
            }),
        }
    }

    pub async fn invoke(&self, args: &Value) -> ToolResult {
        let args: BookingArgs = match serde_json::from_value(args.clone()) {
            Ok(args) => args,
            Err(e) => {
                return ToolResult::failure(format!("Invalid arguments for create_booking: {e}"));
            }
        };

        let Some(booking_type) = BookingType::parse(&args.booking_type) else {
            return ToolResult::failure("Invalid booking type. Must be 'flight' or 'hotel'.");
        };

        // A bare text description is wrapped rather than rejected.
        let booking_details = match args.booking_details {
            Value::String(text) => json!({ "description": text }),
            other => other,
        };

        let created_at = Local::now();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = generate_reference(booking_type, created_at, sequence);

        let record = BookingRecord {
            booking_reference: reference.clone(),
            booking_type,
            status: BOOKING_STATUS_CONFIRMED.to_string(),
            booking_details,
            customer_info: Customer {
                name: args.customer_name,
                email: args.customer_email,
            },
            created_at,
            confirmation_message: format!("Your {booking_type} booking has been confirmed!"),
        };

        if let Err(e) = self.store.store(&record).await {
            return ToolResult::failure(format!("Booking creation failed: {e}"));
        }

        info!(reference = %reference, "booking created");

        match serde_json::to_value(&record) {
            Ok(payload) => ToolResult::live(payload),
            Err(e) => ToolResult::failure(format!("Booking creation failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::FileBookingStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FailingStore;

    #[async_trait]
    impl BookingStore for FailingStore {
        async fn store(&self, _record: &BookingRecord) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    fn hotel_args() -> Value {
        json!({
            "booking_type": "hotel",
            "booking_details": { "hotel": "Grand Plaza Hotel", "nights": 2 },
            "customer_name": "Asha Rao",
            "customer_email": "asha@example.com"
        })
    }

    fn tool_with_tempdir() -> (CreateBookingTool, TempDir) {
        let tmp = TempDir::new().unwrap();
        let tool = CreateBookingTool::new(Arc::new(FileBookingStore::new(tmp.path())));
        (tool, tmp)
    }

    #[tokio::test]
    async fn hotel_booking_is_confirmed_and_persisted() {
        let (tool, tmp) = tool_with_tempdir();

        let result = tool.invoke(&hotel_args()).await;
        assert!(result.success);

        let payload = result.payload.unwrap();
        let reference = payload["booking_reference"].as_str().unwrap();
        assert!(reference.starts_with("HOT-"));
        assert!(reference[4..18].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(payload["status"], "CONFIRMED");
        assert_eq!(
            payload["confirmation_message"],
            "Your hotel booking has been confirmed!"
        );

        let stored = tmp.path().join("bookings").join(format!("{reference}.json"));
        assert!(stored.exists());
    }

    #[tokio::test]
    async fn booking_type_is_accepted_case_insensitively() {
        let (tool, _tmp) = tool_with_tempdir();
        let mut args = hotel_args();
        args["booking_type"] = json!("FLIGHT");

        let result = tool.invoke(&args).await;
        let payload = result.payload.unwrap();

        assert_eq!(payload["booking_type"], "flight");
        assert!(
            payload["booking_reference"]
                .as_str()
                .unwrap()
                .starts_with("FLI-")
        );
    }

    #[tokio::test]
    async fn invalid_booking_type_writes_nothing() {
        let (tool, tmp) = tool_with_tempdir();
        let mut args = hotel_args();
        args["booking_type"] = json!("cruise");

        let result = tool.invoke(&args).await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Invalid booking type. Must be 'flight' or 'hotel'.")
        );
        assert!(!tmp.path().join("bookings").exists());
    }

    #[tokio::test]
    async fn text_details_are_wrapped_in_description() {
        let (tool, _tmp) = tool_with_tempdir();
        let mut args = hotel_args();
        args["booking_details"] = json!("Grand Plaza Hotel, 2 nights, city view");

        let result = tool.invoke(&args).await;
        let payload = result.payload.unwrap();

        assert_eq!(
            payload["booking_details"]["description"],
            "Grand Plaza Hotel, 2 nights, city view"
        );
    }

    #[tokio::test]
    async fn same_second_bookings_get_distinct_references() {
        let (tool, _tmp) = tool_with_tempdir();

        let first = tool.invoke(&hotel_args()).await.payload.unwrap();
        let second = tool.invoke(&hotel_args()).await.payload.unwrap();

        assert_ne!(first["booking_reference"], second["booking_reference"]);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_failed_result() {
        let tool = CreateBookingTool::new(Arc::new(FailingStore));

        let result = tool.invoke(&hotel_args()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn missing_customer_email_fails_validation() {
        let (tool, tmp) = tool_with_tempdir();
        let result = tool
            .invoke(&json!({
                "booking_type": "hotel",
                "booking_details": {},
                "customer_name": "Asha Rao"
            }))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("customer_email"));
        assert!(!tmp.path().join("bookings").exists());
    }

    #[test]
    fn spec_uses_registry_wire_name() {
        let spec = CreateBookingTool::spec();
        assert_eq!(spec.name, "create_booking");
        assert_eq!(spec.kind, ToolKind::CreateBooking);
    }
}
