use crate::agent::{ToolKind, ToolSpec};
use crate::tools::ToolResult;
use anyhow::anyhow;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const SERPAPI_URL: &str = "https://serpapi.com/search";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_FLIGHT_RESULTS: usize = 5;
const MOCK_NOTE: &str = "Sample data shown. Configure SERPAPI_KEY for live data.";

#[derive(Debug, Deserialize)]
struct FlightQuery {
    origin: String,
    destination: String,
    departure_date: String,
    #[serde(default)]
    return_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    best_flights: Vec<SerpApiFlight>,
}

#[derive(Debug, Deserialize)]
struct SerpApiFlight {
    price: Option<Value>,
    total_duration: Option<Value>,
    #[serde(default)]
    flights: Vec<SerpApiLeg>,
}

#[derive(Debug, Deserialize)]
struct SerpApiLeg {
    airline: Option<String>,
    departure_airport: Option<SerpApiStop>,
    arrival_airport: Option<SerpApiStop>,
}

#[derive(Debug, Deserialize)]
struct SerpApiStop {
    time: Option<String>,
}

pub struct FlightSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl FlightSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, api_key }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec {
            kind: ToolKind::FlightSearch,
            name: ToolKind::FlightSearch.name().to_string(),
            description: "Search for available flights between two locations on given dates"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "Departure airport code or city, e.g. 'JFK' or 'New York'"
                    },
                    "destination": {
                        "type": "string",
                        "description": "Arrival airport code or city, e.g. 'CDG' or 'Paris'"
                    },
                    "departure_date": {
                        "type": "string",
                        "description": "Departure date in YYYY-MM-DD format"
                    },
                    "return_date": {
                        "type": "string",
                        "description": "Return date in YYYY-MM-DD format for a round trip; omit for one-way"
                    }
                },
                "required": ["origin", "destination", "departure_date"]
            }),
        }
    }

    pub async fn invoke(&self, args: &Value) -> ToolResult {
        let query: FlightQuery = match serde_json::from_value(args.clone()) {
            Ok(query) => query,
            Err(e) => {
                return ToolResult::failure(format!("Invalid arguments for search_flights: {e}"));
            }
        };

        let Some(api_key) = self.api_key.as_deref() else {
            debug!("no SerpAPI key configured, returning sample flights");
            return mock_flights(&query);
        };

        match self.live_search(api_key, &query).await {
            Ok(payload) => ToolResult::live(payload),
            Err(e) => {
                warn!(error = %e, "flight search failed, falling back to sample data");
                mock_flights(&query)
            }
        }
    }

    async fn live_search(&self, api_key: &str, query: &FlightQuery) -> anyhow::Result<Value> {
        let mut params = vec![
            ("engine", "google_flights".to_string()),
            ("departure_id", query.origin.clone()),
            ("arrival_id", query.destination.clone()),
            ("outbound_date", query.departure_date.clone()),
            ("api_key", api_key.to_string()),
            ("currency", "USD".to_string()),
            ("hl", "en".to_string()),
        ];

        // type 1 is round trip, type 2 is one-way
        if let Some(return_date) = &query.return_date {
            params.push(("return_date", return_date.clone()));
            params.push(("type", "1".to_string()));
        } else {
            params.push(("type", "2".to_string()));
        }

        let response = self.client.get(SERPAPI_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("flight provider returned {}", response.status()));
        }

        let data: SerpApiResponse = response.json().await?;

        let flights: Vec<Value> = data
            .best_flights
            .iter()
            .take(MAX_FLIGHT_RESULTS)
            .map(|flight| {
                let first_leg = flight.flights.first();
                json!({
                    "price": flight.price.clone().unwrap_or(Value::String("N/A".into())),
                    "airline": first_leg
                        .and_then(|leg| leg.airline.as_deref())
                        .unwrap_or("Unknown"),
                    "departure_time": first_leg
                        .and_then(|leg| leg.departure_airport.as_ref())
                        .and_then(|stop| stop.time.as_deref())
                        .unwrap_or("N/A"),
                    "arrival_time": first_leg
                        .and_then(|leg| leg.arrival_airport.as_ref())
                        .and_then(|stop| stop.time.as_deref())
                        .unwrap_or("N/A"),
                    "duration": flight.total_duration.clone().unwrap_or(Value::String("N/A".into())),
                    "layovers": flight.flights.len().saturating_sub(1),
                })
            })
            .collect();

        Ok(json!({
            "origin": query.origin,
            "destination": query.destination,
            "departure_date": query.departure_date,
            "return_date": query.return_date,
            "flights": flights,
            "count": flights.len(),
        }))
    }
}

fn mock_flights(query: &FlightQuery) -> ToolResult {
    let flights = vec![
        json!({
            "price": "$450",
            "airline": "Air India",
            "departure_time": "10:30 AM",
            "arrival_time": "02:45 PM",
            "duration": "2h 15m",
            "layovers": 0
        }),
        json!({
            "price": "$380",
            "airline": "IndiGo",
            "departure_time": "06:15 AM",
            "arrival_time": "10:30 AM",
            "duration": "2h 15m",
            "layovers": 0
        }),
        json!({
            "price": "$520",
            "airline": "Vistara",
            "departure_time": "03:00 PM",
            "arrival_time": "07:20 PM",
            "duration": "2h 20m",
            "layovers": 0
        }),
        json!({
            "price": "$340",
            "airline": "SpiceJet",
            "departure_time": "11:45 PM",
            "arrival_time": "04:00 AM (+1)",
            "duration": "2h 15m",
            "layovers": 0
        }),
    ];
    let count = flights.len();

    ToolResult::mock(
        json!({
            "origin": query.origin,
            "destination": query.destination,
            "departure_date": query.departure_date,
            "return_date": query.return_date,
            "flights": flights,
            "count": count,
        }),
        MOCK_NOTE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ResultSource;
    use serde_json::json;

    fn query_args() -> Value {
        json!({
            "origin": "JFK",
            "destination": "CDG",
            "departure_date": "2025-06-01"
        })
    }

    #[tokio::test]
    async fn missing_required_argument_fails_validation() {
        let tool = FlightSearchTool::new(None);
        let result = tool.invoke(&json!({ "origin": "JFK" })).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("destination"));
        assert!(result.payload.is_none());
    }

    #[tokio::test]
    async fn wrong_argument_type_fails_validation() {
        let tool = FlightSearchTool::new(None);
        let result = tool
            .invoke(&json!({
                "origin": 42,
                "destination": "CDG",
                "departure_date": "2025-06-01"
            }))
            .await;

        assert!(!result.success);
    }

    #[tokio::test]
    async fn no_credentials_returns_mock_flights() {
        let tool = FlightSearchTool::new(None);
        let result = tool.invoke(&query_args()).await;

        assert!(result.success);
        assert_eq!(result.source, ResultSource::Mock);
        assert_eq!(result.note.as_deref(), Some(MOCK_NOTE));

        let payload = result.payload.unwrap();
        assert_eq!(payload["origin"], "JFK");
        assert_eq!(payload["count"], 4);

        let flights = payload["flights"].as_array().unwrap();
        for flight in flights {
            assert!(!flight["price"].as_str().unwrap().is_empty());
            assert!(!flight["airline"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn mock_results_are_deterministic() {
        let tool = FlightSearchTool::new(None);
        let first = tool.invoke(&query_args()).await;
        let second = tool.invoke(&query_args()).await;

        assert_eq!(first.payload, second.payload);
    }

    #[tokio::test]
    async fn round_trip_echoes_return_date() {
        let tool = FlightSearchTool::new(None);
        let result = tool
            .invoke(&json!({
                "origin": "JFK",
                "destination": "CDG",
                "departure_date": "2025-06-01",
                "return_date": "2025-06-10"
            }))
            .await;

        assert_eq!(result.payload.unwrap()["return_date"], "2025-06-10");
    }

    #[test]
    fn spec_uses_registry_wire_name() {
        let spec = FlightSearchTool::spec();
        assert_eq!(spec.name, "search_flights");
        assert_eq!(spec.kind, ToolKind::FlightSearch);
        assert_eq!(spec.parameters["required"][0], "origin");
    }
}
