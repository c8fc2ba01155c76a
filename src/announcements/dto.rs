use serde::{Deserialize, Serialize};
use time::Date;

/// Request body for the daily announcement. The role is kept as a string
/// here so an unknown value produces the validation error, not a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub role: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// One row of the public "today" listing. Only the username, role and day;
/// no ids and no password hashes.
#[derive(Debug, Serialize)]
pub struct TodayAnnouncement {
    pub username: String,
    pub role: String,
    pub date: Date,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn coordinates_default_to_zero() {
        let req: AnnounceRequest = serde_json::from_str(r#"{"role": "driver"}"#).unwrap();
        assert_eq!(req.role, "driver");
        assert_eq!(req.latitude, 0.0);
        assert_eq!(req.longitude, 0.0);
    }

    #[test]
    fn coordinates_are_accepted_when_present() {
        let body = r#"{"role": "passenger", "latitude": 52.52, "longitude": 13.405}"#;
        let req: AnnounceRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.latitude, 52.52);
        assert_eq!(req.longitude, 13.405);
    }

    #[test]
    fn today_listing_exposes_only_public_fields() {
        let item = TodayAnnouncement {
            username: "alice".into(),
            role: "driver".into(),
            date: date!(2024 - 10 - 17),
        };
        let json = serde_json::to_value(&item).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("username"));
        assert!(obj.contains_key("role"));
        assert!(obj.contains_key("date"));
    }
}
