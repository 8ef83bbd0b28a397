//! Clock actions and the timesheet wire payload.
//!
//! The timesheet backend accepts a single remote-procedure envelope:
//! `{"function": "clock", "args": {...}}`. The front end submits a
//! [`ClockRequest`]; the server resolves the caller's email and wraps the
//! request into a [`ClockPayload`] before forwarding it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A clock action: punching in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockAction {
    /// Start of a work period.
    In,
    /// End of a work period.
    Out,
}

impl ClockAction {
    /// Returns the wire representation of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A clock request as submitted by the front end.
///
/// The caller's email is deliberately absent: it is resolved server-side
/// from the authenticated identity, never trusted from the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockRequest {
    /// The action to record.
    pub action: ClockAction,
    /// The employee identifier in the timesheet system.
    pub employee_id: String,
    /// Latitude reported by the browser's geolocation.
    pub latitude: f64,
    /// Longitude reported by the browser's geolocation.
    pub longitude: f64,
}

/// Arguments of the `clock` call sent to the timesheet API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockArgs {
    /// The action to record.
    pub action: ClockAction,
    /// The employee identifier in the timesheet system.
    pub employee_id: String,
    /// Latitude reported by the browser's geolocation.
    pub latitude: f64,
    /// Longitude reported by the browser's geolocation.
    pub longitude: f64,
    /// Email of the authenticated caller.
    pub email: String,
}

/// The envelope the timesheet API expects.
///
/// Serializes to `{"function": "clock", "args": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockPayload {
    /// The remote function name.
    pub function: String,
    /// The function arguments.
    pub args: ClockArgs,
}

impl ClockPayload {
    /// Wraps a front-end request and the resolved caller email into the
    /// envelope the timesheet API expects.
    pub fn clock(request: ClockRequest, email: impl Into<String>) -> Self {
        Self {
            function: "clock".to_string(),
            args: ClockArgs {
                action: request.action,
                employee_id: request.employee_id,
                latitude: request.latitude,
                longitude: request.longitude,
                email: email.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_representation() {
        assert_eq!(ClockAction::In.as_str(), "in");
        assert_eq!(ClockAction::Out.as_str(), "out");
        assert_eq!(
            serde_json::to_string(&ClockAction::In).unwrap(),
            "\"in\""
        );
        assert_eq!(
            serde_json::from_str::<ClockAction>("\"out\"").unwrap(),
            ClockAction::Out
        );
    }

    #[test]
    fn request_deserializes_from_front_end_json() {
        let json = r#"{
            "action": "in",
            "employee_id": "E-1042",
            "latitude": 48.8566,
            "longitude": 2.3522
        }"#;

        let request: ClockRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.action, ClockAction::In);
        assert_eq!(request.employee_id, "E-1042");
    }

    #[test]
    fn payload_envelope_shape() {
        let request = ClockRequest {
            action: ClockAction::Out,
            employee_id: "E-7".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        };

        let payload = ClockPayload::clock(request, "worker@example.com");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["function"], "clock");
        assert_eq!(value["args"]["action"], "out");
        assert_eq!(value["args"]["employee_id"], "E-7");
        assert_eq!(value["args"]["email"], "worker@example.com");
    }

    #[test]
    fn payload_round_trip() {
        let request = ClockRequest {
            action: ClockAction::In,
            employee_id: "E-1".to_string(),
            latitude: 51.5,
            longitude: -0.12,
        };
        let payload = ClockPayload::clock(request, "a@b.c");

        let json = serde_json::to_string(&payload).unwrap();
        let parsed: ClockPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
    }
}
