use rand::distributions::Uniform;
use rand::Rng;
use std::fmt::Debug;

/// Characters a generated device suffix may contain.
pub const DEVICE_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const DEVICE_SUFFIX_LEN: usize = 6;
pub const DEFAULT_DEVICE_PREFIX: &str = "mnet-signup-bot";

/// Source of device names for signups that do not supply one.
pub trait DeviceNameGenerator: Debug + Send + Sync {
    fn generate(&self) -> String;
}

/// `<prefix>-<6 random lowercase alphanumerics>` from the thread RNG.
#[derive(Debug, Clone)]
pub struct RandomDeviceName {
    prefix: String,
}

impl RandomDeviceName {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RandomDeviceName {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_PREFIX)
    }
}

impl DeviceNameGenerator for RandomDeviceName {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let picks = Uniform::from(0..DEVICE_SUFFIX_ALPHABET.len());
        let suffix: String = (0..DEVICE_SUFFIX_LEN)
            .map(|_| DEVICE_SUFFIX_ALPHABET[rng.sample(picks)] as char)
            .collect();
        format!("{}-{}", self.prefix, suffix)
    }
}

/// Always hands out the same name.
#[derive(Debug, Clone)]
pub struct FixedDeviceName(pub String);

impl DeviceNameGenerator for FixedDeviceName {
    fn generate(&self) -> String {
        self.0.clone()
    }
}
