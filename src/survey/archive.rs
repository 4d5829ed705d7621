//! JSON archives for survey results.
//!
//! JSON has no NaN or infinity, and DJS ratios legitimately produce both.
//! Float arrays in an archive are therefore written element by element as a
//! number when finite and as the string `"NaN"`, `"inf"` or `"-inf"`
//! otherwise.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NetstateError, Result};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ArchiveFloat {
    Finite(f64),
    Special(String),
}

impl From<f64> for ArchiveFloat {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Self::Finite(v)
        } else if v.is_nan() {
            Self::Special("NaN".into())
        } else if v > 0.0 {
            Self::Special("inf".into())
        } else {
            Self::Special("-inf".into())
        }
    }
}

impl ArchiveFloat {
    fn into_f64<E: serde::de::Error>(self) -> std::result::Result<f64, E> {
        match self {
            Self::Finite(v) => Ok(v),
            Self::Special(s) => s
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_finite())
                .ok_or_else(|| E::custom(format!("invalid float {s:?}"))),
        }
    }
}

/// `Vec<f64>` with non-finite values preserved.
pub(crate) mod float_seq {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_seq(values.iter().map(|&v| ArchiveFloat::from(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<f64>, D::Error> {
        Vec::<ArchiveFloat>::deserialize(d)?
            .into_iter()
            .map(ArchiveFloat::into_f64)
            .collect()
    }
}

/// `Vec<Vec<f64>>` with non-finite values preserved.
pub(crate) mod float_table {
    use super::*;

    pub fn serialize<S: Serializer>(
        rows: &[Vec<f64>],
        s: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        s.collect_seq(
            rows.iter()
                .map(|row| row.iter().map(|&v| ArchiveFloat::from(v)).collect::<Vec<_>>()),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Vec<Vec<f64>>, D::Error> {
        Vec::<Vec<ArchiveFloat>>::deserialize(d)?
            .into_iter()
            .map(|row| row.into_iter().map(ArchiveFloat::into_f64).collect())
            .collect()
    }
}

/// Write `value` as pretty-printed JSON.
pub(crate) fn save<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| NetstateError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a value written by [`save`].
pub(crate) fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|source| NetstateError::Archive {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
