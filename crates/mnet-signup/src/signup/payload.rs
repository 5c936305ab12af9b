use serde::Serialize;

use super::input::{Gender, OptionalTerm, SignupInput};

pub const SIGNUP_PURPOSE: &str = "signup";

/// Body of the `authToken` call.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenRequest<'a> {
    pub email: &'a str,
    pub purpose: &'static str,
    pub locale: &'a str,
    pub device_name: &'a str,
}

impl<'a> AuthTokenRequest<'a> {
    pub fn from_input(input: &'a SignupInput) -> Self {
        Self {
            email: input.email(),
            purpose: SIGNUP_PURPOSE,
            locale: input.locale(),
            device_name: input.device_name(),
        }
    }
}

/// Body of the `save-tmp` call. `optionalTerms` is omitted when empty.
#[derive(Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveTmpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub gender: Gender,
    pub birth_date: &'a str,
    pub auth_token: &'a str,
    #[serde(skip_serializing_if = "no_terms")]
    pub optional_terms: &'a [OptionalTerm],
}

impl<'a> SaveTmpRequest<'a> {
    pub fn from_input(input: &'a SignupInput, auth_token: &'a str) -> Self {
        Self {
            email: input.email(),
            password: input.password(),
            gender: input.gender(),
            birth_date: input.birth_year(),
            auth_token,
            optional_terms: input.optional_terms(),
        }
    }
}

fn no_terms(terms: &&[OptionalTerm]) -> bool {
    terms.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::device::FixedDeviceName;
    use crate::signup::input::{SignupDefaults, SignupFields};
    use serde_json::json;

    fn input(marketing: Option<&str>) -> SignupInput {
        SignupFields {
            gender: Some("f".to_string()),
            birth_year: Some("2000".to_string()),
            locale: Some("ja".to_string()),
            marketing_terms_version: marketing.map(str::to_string),
            ..SignupFields::new("fan@example.com", "pw")
        }
        .normalize(
            &SignupDefaults::default(),
            &FixedDeviceName("dev-123456".to_string()),
        )
        .expect("valid input")
    }

    #[test]
    fn auth_payload_carries_signup_purpose() {
        let input = input(None);
        let body = serde_json::to_value(AuthTokenRequest::from_input(&input)).unwrap();
        assert_eq!(
            body,
            json!({
                "email": "fan@example.com",
                "purpose": "signup",
                "locale": "ja",
                "deviceName": "dev-123456",
            })
        );
    }

    #[test]
    fn save_payload_keeps_birth_year_as_string_and_omits_empty_terms() {
        let input = input(None);
        let body = serde_json::to_value(SaveTmpRequest::from_input(&input, "tok")).unwrap();
        assert_eq!(
            body,
            json!({
                "email": "fan@example.com",
                "password": "pw",
                "gender": "f",
                "birthDate": "2000",
                "authToken": "tok",
            })
        );
    }

    #[test]
    fn save_payload_includes_marketing_terms() {
        let input = input(Some("5"));
        let body = serde_json::to_value(SaveTmpRequest::from_input(&input, "tok")).unwrap();
        assert_eq!(
            body["optionalTerms"],
            json!([{ "termsId": "marketing", "termsVer": "5" }])
        );
    }
}
