use std::sync::Arc;

use serde_json::json;

use crate::signup::{FixedDeviceName, SignupEndpoints, SignupService};
use crate::transport::testing::{json_response, ScriptedTransport};
use crate::transport::{TransportError, TransportResponse};

pub(super) const BASE_URL: &str = "http://account.test";

pub(super) type Outcome = Result<TransportResponse, TransportError>;

pub(super) fn endpoints() -> SignupEndpoints {
    SignupEndpoints::from_base_url(BASE_URL)
}

pub(super) fn token_ok(token: &str) -> Outcome {
    json_response(200, json!({ "success": true, "data": { "token": token } }))
}

pub(super) fn save_ok() -> Outcome {
    json_response(200, json!({ "success": true, "data": null }))
}

pub(super) fn service_with(
    script: Vec<Outcome>,
) -> (Arc<ScriptedTransport>, SignupService<Arc<ScriptedTransport>>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let service = SignupService::new(transport.clone(), endpoints())
        .with_device_names(Arc::new(FixedDeviceName("test-device".to_string())));
    (transport, service)
}
