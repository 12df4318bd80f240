//! Pipeline outcomes and clarification payloads

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{FinalItinerary, TripQuery};

/// A TripQuery field the user can be asked about or answer
///
/// Ordering follows declaration, so a start date is merged before a
/// duration that depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripField {
    Destination,
    Origin,
    StartDate,
    EndDate,
    Duration,
    Travelers,
    Budget,
    Interests,
}

impl TripField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destination => "destination",
            Self::Origin => "origin",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Duration => "duration",
            Self::Travelers => "travelers",
            Self::Budget => "budget",
            Self::Interests => "interests",
        }
    }
}

impl fmt::Display for TripField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "destination" => Ok(Self::Destination),
            "origin" => Ok(Self::Origin),
            "start_date" | "start" => Ok(Self::StartDate),
            "end_date" | "end" => Ok(Self::EndDate),
            "duration" | "days" => Ok(Self::Duration),
            "travelers" | "travellers" => Ok(Self::Travelers),
            "budget" | "budget_usd" => Ok(Self::Budget),
            "interests" => Ok(Self::Interests),
            other => Err(format!("Unknown trip field: '{}'", other)),
        }
    }
}

/// Expected shape of a clarification answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Date,
    Number,
}

/// One absent field the user is asked to supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingField {
    pub field: TripField,
    pub question: String,
    pub input_type: InputType,
    pub required: bool,
    /// 1 is asked first
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Intermediate result: the run stopped to ask the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    pub missing_info: Vec<MissingField>,
    pub original_query: String,
    pub parsed_so_far: TripQuery,
    pub suggested_query: String,
}

/// Terminal state of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    NeedsMoreInfo(ClarificationRequest),
    Complete(Box<FinalItinerary>),
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn itinerary(&self) -> Option<&FinalItinerary> {
        match self {
            Self::Complete(itinerary) => Some(itinerary),
            Self::NeedsMoreInfo(_) => None,
        }
    }

    pub fn clarification(&self) -> Option<&ClarificationRequest> {
        match self {
            Self::NeedsMoreInfo(request) => Some(request),
            Self::Complete(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_field_from_str_aliases() {
        assert_eq!("start-date".parse::<TripField>(), Ok(TripField::StartDate));
        assert_eq!("Budget".parse::<TripField>(), Ok(TripField::Budget));
        assert_eq!("days".parse::<TripField>(), Ok(TripField::Duration));
        assert!("weather".parse::<TripField>().is_err());
    }

    #[test]
    fn test_needs_more_info_serializes_with_status_tag() {
        let outcome = PipelineOutcome::NeedsMoreInfo(ClarificationRequest {
            missing_info: vec![MissingField {
                field: TripField::Destination,
                question: "Where to?".to_string(),
                input_type: InputType::Text,
                required: true,
                priority: 1,
                hint: None,
            }],
            original_query: "plan me a trip".to_string(),
            parsed_so_far: TripQuery::default(),
            suggested_query: String::new(),
        });

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "needs_more_info");
        assert_eq!(value["missing_info"][0]["field"], "destination");
        assert_eq!(value["missing_info"][0]["priority"], 1);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_complete_serializes_with_status_tag() {
        let outcome = PipelineOutcome::Complete(Box::new(FinalItinerary {
            destination: "Tokyo".to_string(),
            ..Default::default()
        }));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "complete");
        assert_eq!(value["destination"], "Tokyo");
        assert_eq!(outcome.itinerary().map(|i| i.destination.as_str()), Some("Tokyo"));
    }
}
