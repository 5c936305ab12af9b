use serde::{Deserialize, Serialize};
use std::fmt;

use super::device::DeviceNameGenerator;

pub const DEFAULT_BIRTH_YEAR: &str = "1998";
pub const DEFAULT_LOCALE: &str = "en";
pub const MARKETING_TERMS_ID: &str = "marketing";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, InputError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(Gender::Male),
            "f" => Ok(Gender::Female),
            _ => Err(InputError::InvalidGender(raw.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One terms-of-service acceptance attached to the save payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionalTerm {
    #[serde(rename = "termsId")]
    pub terms_id: String,
    #[serde(rename = "termsVer")]
    pub terms_version: String,
}

impl OptionalTerm {
    pub fn marketing(version: impl Into<String>) -> Self {
        Self {
            terms_id: MARKETING_TERMS_ID.to_string(),
            terms_version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
    #[error("gender must be 'm' or 'f' (got '{0}')")]
    InvalidGender(String),
    #[error("birth year must be four digits (got '{0}')")]
    InvalidBirthYear(String),
}

/// Fallbacks applied to any field a caller leaves blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDefaults {
    pub gender: Gender,
    pub birth_year: String,
    pub locale: String,
    pub device_name: Option<String>,
    pub marketing_terms_version: Option<String>,
}

impl Default for SignupDefaults {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            birth_year: DEFAULT_BIRTH_YEAR.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            device_name: None,
            marketing_terms_version: None,
        }
    }
}

/// Raw, untrusted fields as they arrive from a JSON body, CSV row, or CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupFields {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_year: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub marketing_terms_version: Option<String>,
}

impl SignupFields {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Trimmed email, `None` when blank.
    pub fn email(&self) -> Option<&str> {
        present(&self.email)
    }

    /// True when both required fields carry something other than whitespace.
    pub fn has_credentials(&self) -> bool {
        present(&self.email).is_some() && present(&self.password).is_some()
    }

    /// Trim, fill defaults, validate enumerations, and pin the device name.
    pub fn normalize(
        &self,
        defaults: &SignupDefaults,
        devices: &dyn DeviceNameGenerator,
    ) -> Result<SignupInput, InputError> {
        let email = present(&self.email).ok_or(InputError::MissingEmail)?;
        let password = present(&self.password).ok_or(InputError::MissingPassword)?;

        let gender = match present(&self.gender) {
            Some(raw) => Gender::parse(raw)?,
            None => defaults.gender,
        };

        let birth_year = present(&self.birth_year)
            .unwrap_or(defaults.birth_year.as_str())
            .to_string();
        if birth_year.len() != 4 || !birth_year.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(InputError::InvalidBirthYear(birth_year));
        }

        let locale = present(&self.locale)
            .unwrap_or(defaults.locale.as_str())
            .to_string();

        let device_name = present(&self.device_name)
            .or_else(|| present(&defaults.device_name))
            .map(str::to_string)
            .unwrap_or_else(|| devices.generate());

        let optional_terms = present(&self.marketing_terms_version)
            .or_else(|| present(&defaults.marketing_terms_version))
            .map(|version| vec![OptionalTerm::marketing(version)])
            .unwrap_or_default();

        Ok(SignupInput {
            email: email.to_string(),
            password: password.to_string(),
            gender,
            birth_year,
            locale,
            device_name,
            optional_terms,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

/// Normalized parameters for exactly one signup run. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupInput {
    email: String,
    password: String,
    gender: Gender,
    birth_year: String,
    locale: String,
    device_name: String,
    optional_terms: Vec<OptionalTerm>,
}

impl SignupInput {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn birth_year(&self) -> &str {
        &self.birth_year
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn optional_terms(&self) -> &[OptionalTerm] {
        &self.optional_terms
    }
}

impl fmt::Debug for SignupInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("gender", &self.gender)
            .field("birth_year", &self.birth_year)
            .field("locale", &self.locale)
            .field("device_name", &self.device_name)
            .field("optional_terms", &self.optional_terms)
            .finish()
    }
}
