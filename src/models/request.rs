//! Map request payloads and their validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::color::FillColor;
use crate::error::{MapError, MapResult};

/// Radius as sent by clients: either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RadiusInput {
    Number(f64),
    Text(String),
}

/// Request body exactly as received. Older clients send the Spanish keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMapRequest {
    #[serde(alias = "localidad")]
    pub place: Option<String>,
    #[serde(alias = "provincia")]
    pub admin1: Option<String>,
    #[serde(alias = "radio")]
    pub radius: Option<RadiusInput>,
    pub color: Option<String>,
    #[serde(alias = "nombre")]
    pub name: Option<String>,
}

/// A validated map request.
#[derive(Debug, Clone)]
pub struct MapRequest {
    pub place: String,
    pub admin1: String,
    pub radius_km: f64,
    pub color: FillColor,
    /// Output base name, already sanitized for use in a file name
    pub name: String,
}

fn required(field: &str, value: Option<String>) -> MapResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MapError::Validation(format!("missing required field '{}'", field))),
    }
}

impl RawMapRequest {
    pub fn validate(self, max_radius_km: f64) -> MapResult<MapRequest> {
        let place = required("place", self.place)?;
        let admin1 = required("admin1", self.admin1)?;
        let name = sanitize_name(&required("name", self.name)?);
        if name.is_empty() {
            return Err(MapError::Validation(
                "field 'name' has no usable characters".to_string(),
            ));
        }

        let radius_km = match self.radius {
            Some(RadiusInput::Number(n)) => n,
            Some(RadiusInput::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
                MapError::Validation(format!("radius '{}' is not a number", s))
            })?,
            None => return Err(MapError::Validation("missing required field 'radius'".to_string())),
        };
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(MapError::Validation(format!(
                "radius must be a positive number of kilometers, got {}",
                radius_km
            )));
        }
        if radius_km > max_radius_km {
            return Err(MapError::Validation(format!(
                "radius {} km exceeds the maximum of {} km",
                radius_km, max_radius_km
            )));
        }

        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => FillColor::default(),
            Some(c) => c
                .parse()
                .map_err(|e: super::color::ParseColorError| MapError::Validation(e.to_string()))?,
        };

        Ok(MapRequest {
            place,
            admin1,
            radius_km,
            color,
            name,
        })
    }
}

impl MapRequest {
    /// `map_{name}_{YYYY-MM-DD}.pdf`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("map_{}_{}.pdf", self.name, date.format("%Y-%m-%d"))
    }
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        String::new()
    } else {
        cleaned
    }
}

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct MapResponse {
    pub url: String,
    pub file_name: String,
    pub included: Vec<String>,
    pub bordering: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawMapRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_english_keys() {
        let req = raw(r##"{"place":"Rafaela","admin1":"Santa Fe","radius":50,"color":"#ff0000","name":"zona norte"}"##)
            .validate(2000.0)
            .unwrap();
        assert_eq!(req.place, "Rafaela");
        assert_eq!(req.admin1, "Santa Fe");
        assert_eq!(req.radius_km, 50.0);
        assert_eq!(req.color, FillColor::rgb(0xff, 0, 0));
        assert_eq!(req.name, "zona_norte");
    }

    #[test]
    fn test_legacy_keys_and_string_radius() {
        let req = raw(r#"{"localidad":"Rafaela","provincia":"Santa Fe","radio":"75.5","nombre":"x"}"#)
            .validate(2000.0)
            .unwrap();
        assert_eq!(req.radius_km, 75.5);
        assert_eq!(req.color, FillColor::default());
    }

    #[test]
    fn test_rejects_bad_radius() {
        for body in [
            r#"{"place":"a","admin1":"b","radius":0,"name":"n"}"#,
            r#"{"place":"a","admin1":"b","radius":-5,"name":"n"}"#,
            r#"{"place":"a","admin1":"b","radius":"fifty","name":"n"}"#,
            r#"{"place":"a","admin1":"b","radius":"NaN","name":"n"}"#,
            r#"{"place":"a","admin1":"b","radius":5000,"name":"n"}"#,
            r#"{"place":"a","admin1":"b","name":"n"}"#,
        ] {
            let err = raw(body).validate(2000.0).unwrap_err();
            assert!(matches!(err, MapError::Validation(_)), "{}", body);
        }
    }

    #[test]
    fn test_rejects_missing_fields() {
        let err = raw(r#"{"admin1":"b","radius":10,"name":"n"}"#)
            .validate(2000.0)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required field 'place'");

        let err = raw(r#"{"place":"a","admin1":"  ","radius":10,"name":"n"}"#)
            .validate(2000.0)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required field 'admin1'");

        let err = raw(r#"{"place":"a","admin1":"b","radius":10,"name":"///"}"#)
            .validate(2000.0)
            .unwrap_err();
        assert!(matches!(err, MapError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = raw(r##"{"place":"a","admin1":"b","radius":10,"name":"n","color":"#zz0000"}"##)
            .validate(2000.0)
            .unwrap_err();
        assert!(matches!(err, MapError::Validation(_)));
    }

    #[test]
    fn test_file_name() {
        let req = raw(r#"{"place":"a","admin1":"b","radius":10,"name":"Río Cuarto"}"#)
            .validate(2000.0)
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(req.file_name(date), "map_R_o_Cuarto_2024-03-07.pdf");
    }
}
