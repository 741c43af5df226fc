use crate::errors::RegistryError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    FlightSearch,
    HotelSearch,
    CreateBooking,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlightSearch => "search_flights",
            Self::HotelSearch => "search_hotels",
            Self::CreateBooking => "create_booking",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "search_flights" => Some(Self::FlightSearch),
            "search_hotels" => Some(Self::HotelSearch),
            "create_booking" => Some(Self::CreateBooking),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ToolSpec) -> Result<(), RegistryError> {
        if self.specs.iter().any(|s| s.name == spec.name) {
            return Err(RegistryError::DuplicateTool(spec.name));
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&ToolSpec, RegistryError> {
        self.specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn describe_all(&self) -> &[ToolSpec] {
        &self.specs
    }
}
