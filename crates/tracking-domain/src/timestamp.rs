//! Lectura tolerante de marcas de tiempo.
//!
//! El backend emite `created_at` con `datetime.now().isoformat()`, es decir
//! sin zona horaria, mientras que otras rutas emiten RFC 3339 completo. Los
//! valores sin zona se interpretan como UTC. Se usa con
//! `#[serde(with = "tracking_domain::timestamp")]`.
use crate::DomainError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Interpreta una marca de tiempo en RFC 3339, ISO sin zona o sólo fecha.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, DomainError> {
  let trimmed = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
    return Ok(dt.with_timezone(&Utc));
  }
  for fmt in NAIVE_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
      return Ok(naive.and_utc());
    }
  }
  if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
    if let Some(naive) = date.and_hms_opt(0, 0, 0) {
      return Ok(naive.and_utc());
    }
  }
  Err(DomainError::ValidationError(format!("Marca de tiempo inválida: {}", raw)))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
  where S: Serializer
{
  serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
  where D: Deserializer<'de>
{
  let raw = String::deserialize(deserializer)?;
  parse(&raw).map_err(serde::de::Error::custom)
}
