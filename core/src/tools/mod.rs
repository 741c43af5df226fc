use crate::agent::{ToolKind, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod booking;
pub mod flight_search;
pub mod hotel_search;

pub use booking::CreateBookingTool;
pub use flight_search::FlightSearchTool;
pub use hotel_search::{AmadeusCredentials, HotelSearchTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Live,
    Mock,
}

/// Adapters never raise past their boundary: bad arguments and provider
/// failures come back as `success: false` or as a mock-data fallback, and
/// mock payloads carry the same field names as live ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: ResultSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ToolResult {
    pub fn live(payload: Value) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
            source: ResultSource::Live,
            note: None,
        }
    }

    pub fn mock(payload: Value, note: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
            source: ResultSource::Mock,
            note: Some(note.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.into()),
            source: ResultSource::Live,
            note: None,
        }
    }
}

pub struct Toolbox {
    registry: ToolRegistry,
    flights: FlightSearchTool,
    hotels: HotelSearchTool,
    bookings: CreateBookingTool,
}

impl Toolbox {
    pub fn new(
        flights: FlightSearchTool,
        hotels: HotelSearchTool,
        bookings: CreateBookingTool,
    ) -> anyhow::Result<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(FlightSearchTool::spec())?;
        registry.register(HotelSearchTool::spec())?;
        registry.register(CreateBookingTool::spec())?;

        Ok(Self {
            registry,
            flights,
            hotels,
            bookings,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn invoke(&self, kind: ToolKind, args: &Value) -> ToolResult {
        match kind {
            ToolKind::FlightSearch => self.flights.invoke(args).await,
            ToolKind::HotelSearch => self.hotels.invoke(args).await,
            ToolKind::CreateBooking => self.bookings.invoke(args).await,
        }
    }
}
