use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::{excerpt, CallLabel, SignupError};
use super::input::SignupInput;
use super::payload::{AuthTokenRequest, SaveTmpRequest};
use crate::transport::{Transport, TransportRequest, TransportResponse};

pub const AUTH_TOKEN_PATH: &str = "/api/account-service/v1/user/email/authToken";
pub const SAVE_TMP_PATH: &str = "/api/account-service/v1/user/signup/save-tmp";

/// Absolute URLs of the two account-service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupEndpoints {
    pub auth_token: String,
    pub save_tmp: String,
}

impl SignupEndpoints {
    pub fn from_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            auth_token: format!("{base}{AUTH_TOKEN_PATH}"),
            save_tmp: format!("{base}{SAVE_TMP_PATH}"),
        }
    }
}

/// Token issued by the `authToken` call, valid for one `save-tmp`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Progress of one run. `Failed` is the `Err` arm of [`SignupWorkflow::run`].
#[derive(Debug)]
enum SignupState {
    Init,
    TokenRequested(TransportResponse),
    TokenAcquired(AuthToken),
    SignupSubmitted(TransportResponse),
    Done,
}

impl SignupState {
    fn name(&self) -> &'static str {
        match self {
            SignupState::Init => "init",
            SignupState::TokenRequested(_) => "token_requested",
            SignupState::TokenAcquired(_) => "token_acquired",
            SignupState::SignupSubmitted(_) => "signup_submitted",
            SignupState::Done => "done",
        }
    }
}

/// Drives `authToken` then `save-tmp` over a [`Transport`].
#[derive(Debug, Clone)]
pub struct SignupWorkflow<T> {
    transport: T,
    endpoints: SignupEndpoints,
}

impl<T> SignupWorkflow<T>
where
    T: Transport,
{
    pub fn new(transport: T, endpoints: SignupEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Run both calls for `input`. The token is never cached across runs,
    /// and a failed `save-tmp` does not retry or undo the token request.
    pub async fn run(&self, input: &SignupInput) -> Result<(), SignupError> {
        let mut state = SignupState::Init;

        loop {
            debug!(email = %input.email(), state = state.name(), "signup transition");
            state = match state {
                SignupState::Init => {
                    info!(email = %input.email(), "requesting auth token");
                    let payload = AuthTokenRequest::from_input(input);
                    let response = self
                        .post(CallLabel::AuthToken, &self.endpoints.auth_token, &payload)
                        .await?;
                    SignupState::TokenRequested(response)
                }
                SignupState::TokenRequested(response) => {
                    let body = accept_response(CallLabel::AuthToken, response)?;
                    let token = extract_token(&body)?;
                    info!(email = %input.email(), "auth token acquired, submitting save-tmp");
                    SignupState::TokenAcquired(token)
                }
                SignupState::TokenAcquired(token) => {
                    let payload = SaveTmpRequest::from_input(input, token.as_str());
                    let response = self
                        .post(CallLabel::SaveTmp, &self.endpoints.save_tmp, &payload)
                        .await?;
                    SignupState::SignupSubmitted(response)
                }
                SignupState::SignupSubmitted(response) => {
                    accept_response(CallLabel::SaveTmp, response)?;
                    SignupState::Done
                }
                SignupState::Done => {
                    info!(email = %input.email(), "signup save-tmp accepted");
                    return Ok(());
                }
            };
        }
    }

    async fn post<B: Serialize>(
        &self,
        label: CallLabel,
        url: &str,
        payload: &B,
    ) -> Result<TransportResponse, SignupError> {
        let request =
            TransportRequest::post_json(url, payload).map_err(|err| SignupError::Protocol {
                label,
                message: format!("unable to encode request: {err}"),
                body: String::new(),
            })?;

        self.transport
            .send(&request)
            .await
            .map_err(|source| SignupError::Transport { label, source })
    }
}

/// Status, then JSON, then `success == true`.
fn accept_response(label: CallLabel, response: TransportResponse) -> Result<Value, SignupError> {
    debug!(%label, status = %response.status, body = %response.body, "account service response");

    if response.status.as_u16() >= 400 {
        return Err(SignupError::Http {
            label,
            status: response.status.as_u16(),
            body: excerpt(&response.body),
        });
    }

    let body: Value =
        serde_json::from_str(&response.body).map_err(|err| SignupError::Protocol {
            label,
            message: format!("non-JSON response ({err})"),
            body: excerpt(&response.body),
        })?;

    let succeeded = body
        .as_object()
        .and_then(|map| map.get("success"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !succeeded {
        return Err(SignupError::Application {
            label,
            body: excerpt(&body.to_string()),
        });
    }

    Ok(body)
}

fn extract_token(body: &Value) -> Result<AuthToken, SignupError> {
    body.pointer("/data/token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(|token| AuthToken(token.to_string()))
        .ok_or_else(|| SignupError::Protocol {
            label: CallLabel::AuthToken,
            message: "missing token".to_string(),
            body: excerpt(&body.to_string()),
        })
}
