use std::sync::Arc;

use tracing::debug;

use super::device::{DeviceNameGenerator, RandomDeviceName};
use super::error::SignupError;
use super::input::{SignupDefaults, SignupFields, SignupInput};
use super::workflow::{SignupEndpoints, SignupWorkflow};
use crate::config::SignupConfig;
use crate::transport::{make_client, HttpTransport, RetryingTransport, Transport};

pub type HttpSignupService = SignupService<RetryingTransport<HttpTransport>>;

/// Entry point shared by the CLI, the batch runner, and the HTTP router.
#[derive(Debug)]
pub struct SignupService<T> {
    workflow: SignupWorkflow<T>,
    devices: Arc<dyn DeviceNameGenerator>,
    defaults: SignupDefaults,
}

impl HttpSignupService {
    pub fn from_config(config: &SignupConfig) -> Result<Self, SignupError> {
        let transport = make_client(&config.transport).map_err(SignupError::ClientSetup)?;
        Ok(Self::new(
            transport,
            SignupEndpoints::from_base_url(&config.base_url),
        ))
    }
}

impl<T> SignupService<T>
where
    T: Transport,
{
    pub fn new(transport: T, endpoints: SignupEndpoints) -> Self {
        Self {
            workflow: SignupWorkflow::new(transport, endpoints),
            devices: Arc::new(RandomDeviceName::default()),
            defaults: SignupDefaults::default(),
        }
    }

    pub fn with_device_names(mut self, devices: Arc<dyn DeviceNameGenerator>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_defaults(mut self, defaults: SignupDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &SignupDefaults {
        &self.defaults
    }

    /// Normalize raw fields against `defaults` without touching the network.
    pub fn prepare(
        &self,
        fields: &SignupFields,
        defaults: &SignupDefaults,
    ) -> Result<SignupInput, SignupError> {
        Ok(fields.normalize(defaults, self.devices.as_ref())?)
    }

    pub async fn signup(&self, fields: SignupFields) -> Result<(), SignupError> {
        self.signup_with(&fields, &self.defaults).await
    }

    pub async fn signup_with(
        &self,
        fields: &SignupFields,
        defaults: &SignupDefaults,
    ) -> Result<(), SignupError> {
        let input = self.prepare(fields, defaults)?;
        debug!(?input, "starting signup");
        self.workflow.run(&input).await
    }
}

/// One-shot signup on a fresh client, as the single-record front-ends do.
pub async fn run_single(fields: SignupFields, config: &SignupConfig) -> Result<(), SignupError> {
    HttpSignupService::from_config(config)?.signup(fields).await
}
