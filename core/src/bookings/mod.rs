use crate::traits::BookingStore;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const BOOKING_STATUS_CONFIRMED: &str = "CONFIRMED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Flight,
    Hotel,
}

impl BookingType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "flight" => Some(Self::Flight),
            "hotel" => Some(Self::Hotel),
            _ => None,
        }
    }

    pub fn reference_prefix(&self) -> &'static str {
        match self {
            Self::Flight => "FLI",
            Self::Hotel => "HOT",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flight => write!(f, "flight"),
            Self::Hotel => write!(f, "hotel"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_reference: String,
    pub booking_type: BookingType,
    pub status: String,
    pub booking_details: serde_json::Value,
    pub customer_info: Customer,
    pub created_at: DateTime<Local>,
    pub confirmation_message: String,
}

/// `HOT-20250601143022-0001`: type prefix, second-resolution timestamp, and
/// a per-process sequence keeping same-second bookings distinct.
pub fn generate_reference(
    booking_type: BookingType,
    at: DateTime<Local>,
    sequence: u64,
) -> String {
    format!(
        "{}-{}-{:04}",
        booking_type.reference_prefix(),
        at.format("%Y%m%d%H%M%S"),
        sequence
    )
}

pub struct FileBookingStore {
    bookings_dir: PathBuf,
}

impl FileBookingStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            bookings_dir: data_dir.as_ref().join("bookings"),
        }
    }
}

#[async_trait]
impl BookingStore for FileBookingStore {
    async fn store(&self, record: &BookingRecord) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.bookings_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create bookings directory at {}",
                    self.bookings_dir.display()
                )
            })?;

        let path = self
            .bookings_dir
            .join(format!("{}.json", record.booking_reference));
        let content = serde_json::to_string_pretty(record)
            .context("Failed to serialize booking record")?;

        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write booking to {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_record(reference: &str) -> BookingRecord {
        BookingRecord {
            booking_reference: reference.to_string(),
            booking_type: BookingType::Hotel,
            status: BOOKING_STATUS_CONFIRMED.to_string(),
            booking_details: serde_json::json!({ "hotel": "Grand Plaza Hotel", "nights": 2 }),
            customer_info: Customer {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
            },
            created_at: Local::now(),
            confirmation_message: "Your hotel booking has been confirmed!".to_string(),
        }
    }

    #[test]
    fn booking_type_parse_is_case_insensitive() {
        assert_eq!(BookingType::parse("flight"), Some(BookingType::Flight));
        assert_eq!(BookingType::parse("FLIGHT"), Some(BookingType::Flight));
        assert_eq!(BookingType::parse("Hotel"), Some(BookingType::Hotel));
        assert_eq!(BookingType::parse("cruise"), None);
        assert_eq!(BookingType::parse(""), None);
    }

    #[test]
    fn reference_has_prefix_timestamp_and_sequence() {
        let at = Local.with_ymd_and_hms(2025, 6, 1, 14, 30, 22).unwrap();
        let reference = generate_reference(BookingType::Hotel, at, 7);

        assert_eq!(reference, "HOT-20250601143022-0007");
        assert!(reference[4..18].chars().all(|c| c.is_ascii_digit()));

        let reference = generate_reference(BookingType::Flight, at, 12345);
        assert_eq!(reference, "FLI-20250601143022-12345");
    }

    #[test]
    fn same_second_references_stay_distinct() {
        let at = Local.with_ymd_and_hms(2025, 6, 1, 14, 30, 22).unwrap();
        let first = generate_reference(BookingType::Flight, at, 1);
        let second = generate_reference(BookingType::Flight, at, 2);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn file_store_writes_record_json() {
        let tmp = TempDir::new().unwrap();
        let store = FileBookingStore::new(tmp.path());
        let record = sample_record("HOT-20250601143022-0001");

        store.store(&record).await.unwrap();

        let path = tmp
            .path()
            .join("bookings")
            .join("HOT-20250601143022-0001.json");
        let content = std::fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(parsed["booking_reference"], "HOT-20250601143022-0001");
        assert_eq!(parsed["booking_type"], "hotel");
        assert_eq!(parsed["status"], "CONFIRMED");
        assert_eq!(parsed["customer_info"]["email"], "asha@example.com");
        assert_eq!(parsed["booking_details"]["nights"], 2);
    }

    #[tokio::test]
    async fn file_store_creates_directory_on_demand() {
        let tmp = TempDir::new().unwrap();
        let store = FileBookingStore::new(tmp.path().join("nested"));

        store.store(&sample_record("FLI-20250601143022-0001")).await.unwrap();

        assert!(
            tmp.path()
                .join("nested")
                .join("bookings")
                .join("FLI-20250601143022-0001.json")
                .exists()
        );
    }
}
