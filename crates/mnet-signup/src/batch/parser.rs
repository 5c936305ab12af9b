use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::signup::SignupFields;

/// One data row of a batch file, numbered from 1 after the header.
#[derive(Debug, Clone)]
pub struct BatchRow {
    pub row: usize,
    pub fields: SignupFields,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<BatchRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<SignupCsvRow>().enumerate() {
        let row = record?;
        rows.push(BatchRow {
            row: index + 1,
            fields: row.into_fields(),
        });
    }

    Ok(rows)
}

/// Recognized columns; anything else in the header is ignored.
#[derive(Debug, Deserialize)]
struct SignupCsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    password: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    birth_year: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    device_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    locale: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    marketing_terms_version: Option<String>,
}

impl SignupCsvRow {
    fn into_fields(self) -> SignupFields {
        SignupFields {
            email: self.email,
            password: self.password,
            gender: self.gender,
            birth_year: self.birth_year,
            locale: self.locale,
            device_name: self.device_name,
            marketing_terms_version: self.marketing_terms_version,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
