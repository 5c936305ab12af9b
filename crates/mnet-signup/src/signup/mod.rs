//! The two-call signup workflow, its request model, and the HTTP routes
//! that expose it.

mod device;
mod error;
mod input;
mod payload;
pub mod router;
mod service;
mod workflow;

#[cfg(test)]
mod tests;

pub use device::{
    DeviceNameGenerator, FixedDeviceName, RandomDeviceName, DEFAULT_DEVICE_PREFIX,
    DEVICE_SUFFIX_ALPHABET, DEVICE_SUFFIX_LEN,
};
pub use error::{CallLabel, FailureKind, SignupError, MAX_BODY_EXCERPT};
pub use input::{
    Gender, InputError, OptionalTerm, SignupDefaults, SignupFields, SignupInput,
    DEFAULT_BIRTH_YEAR, DEFAULT_LOCALE,
};
pub use payload::{AuthTokenRequest, SaveTmpRequest};
pub use router::signup_router;
pub use service::{run_single, HttpSignupService, SignupService};
pub use workflow::{AuthToken, SignupEndpoints, SignupWorkflow, AUTH_TOKEN_PATH, SAVE_TMP_PATH};
