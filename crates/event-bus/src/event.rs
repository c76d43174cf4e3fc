use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to publish one event.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    /// Name of the bus the event is sent to.
    pub bus_name: String,
    /// Identifies the producer (e.g. `com.swn.basket.checkoutbasket`).
    pub source: String,
    /// Identifies the kind of event (e.g. `CheckoutBasket`).
    pub detail_type: String,
    /// The event payload.
    pub detail: serde_json::Value,
}

impl PublishRequest {
    /// Creates a publish request with a serializable payload.
    pub fn new<T: Serialize>(
        bus_name: impl Into<String>,
        source: impl Into<String>,
        detail_type: impl Into<String>,
        detail: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            bus_name: bus_name.into(),
            source: source.into(),
            detail_type: detail_type.into(),
            detail: serde_json::to_value(detail)?,
        })
    }
}

/// Acknowledgement returned by the bus for an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub event_id: Uuid,
}

/// An event as delivered by the bus to its subscribers.
///
/// Field names follow the common bus envelope (`detail-type`, `source`,
/// `detail`), so queue message bodies carry the whole envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: Uuid,
    pub source: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub time: DateTime<Utc>,
    pub detail: serde_json::Value,
}

impl BusEvent {
    /// Wraps a publish request into a delivered event with a fresh id.
    pub fn from_request(request: &PublishRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: request.source.clone(),
            detail_type: request.detail_type.clone(),
            time: Utc::now(),
            detail: request.detail.clone(),
        }
    }

    /// Deserializes the payload into a typed value.
    pub fn detail_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_event_uses_envelope_field_names() {
        let request = PublishRequest::new(
            "SwnEventBus",
            "com.swn.basket.checkoutbasket",
            "CheckoutBasket",
            &serde_json::json!({"userName": "alice"}),
        )
        .unwrap();
        let event = BusEvent::from_request(&request);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["detail-type"], "CheckoutBasket");
        assert_eq!(json["source"], "com.swn.basket.checkoutbasket");
        assert_eq!(json["detail"]["userName"], "alice");
    }

    #[test]
    fn detail_as_reads_typed_payload() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(rename = "userName")]
            user_name: String,
        }

        let request = PublishRequest::new(
            "bus",
            "src",
            "Type",
            &serde_json::json!({"userName": "bob"}),
        )
        .unwrap();
        let event = BusEvent::from_request(&request);
        let payload: Payload = event.detail_as().unwrap();
        assert_eq!(payload.user_name, "bob");
    }
}
