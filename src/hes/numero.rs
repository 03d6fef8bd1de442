// Copyright 2025 Cowboy AI, LLC.

//! Human-readable HES sequence numbers
//!
//! Every service entry carries a number formatted `HES-<year>-<seq>` where
//! the sequence is four digits, zero-padded, restarting at 1 each calendar
//! year. The number is allocated at creation time from the last persisted
//! sequence for the year.

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest sequence representable in the four-digit segment
const MAX_SECUENCIA: u32 = 9999;

/// A validated `HES-<year>-<seq>` number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumeroHes {
    anio: i32,
    secuencia: u32,
}

// On the wire a number is its string form, so the schema is a plain string.
impl schemars::JsonSchema for NumeroHes {
    fn schema_name() -> String {
        "NumeroHes".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(gen)
    }
}

impl NumeroHes {
    /// Build a number from its parts, validating the ranges
    pub fn new(anio: i32, secuencia: u32) -> DomainResult<Self> {
        if !(2000..=9999).contains(&anio) {
            return Err(DomainError::validation(
                "numero.anio",
                format!("year {anio} outside supported range 2000-9999"),
            ));
        }
        if secuencia == 0 || secuencia > MAX_SECUENCIA {
            return Err(DomainError::validation(
                "numero.secuencia",
                format!("sequence {secuencia} outside range 1-{MAX_SECUENCIA}"),
            ));
        }
        Ok(Self { anio, secuencia })
    }

    /// First number of a calendar year (`HES-<year>-0001`)
    pub fn primero_del_anio(anio: i32) -> DomainResult<Self> {
        Self::new(anio, 1)
    }

    /// The next number within the same year
    pub fn siguiente(&self) -> DomainResult<Self> {
        Self::new(self.anio, self.secuencia + 1)
    }

    /// Calendar year segment
    pub fn anio(&self) -> i32 {
        self.anio
    }

    /// Sequence segment
    pub fn secuencia(&self) -> u32 {
        self.secuencia
    }
}

impl fmt::Display for NumeroHes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HES-{}-{:04}", self.anio, self.secuencia)
    }
}

impl FromStr for NumeroHes {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let invalid = || {
            DomainError::validation(
                "numero",
                format!("`{s}` does not match HES-<year>-<seq>"),
            )
        };

        let rest = s.strip_prefix("HES-").ok_or_else(invalid)?;
        let (anio_str, seq_str) = rest.split_once('-').ok_or_else(invalid)?;
        if anio_str.len() != 4 || seq_str.len() != 4 {
            return Err(invalid());
        }
        let anio: i32 = anio_str.parse().map_err(|_| invalid())?;
        let secuencia: u32 = seq_str.parse().map_err(|_| invalid())?;

        Self::new(anio, secuencia)
    }
}

impl TryFrom<String> for NumeroHes {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        value.parse()
    }
}

impl From<NumeroHes> for String {
    fn from(numero: NumeroHes) -> Self {
        numero.to_string()
    }
}
