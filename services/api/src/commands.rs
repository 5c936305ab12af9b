use crate::cli::{BatchArgs, SignupArgs, SingleArgs, TransportArgs};
use mnet_signup::batch::parse_rows_from_path;
use mnet_signup::config::{backoff_from_secs, AppConfig, SignupConfig};
use mnet_signup::error::AppError;
use mnet_signup::signup::{
    run_single, Gender, HttpSignupService, SignupDefaults, SignupError, SignupFields,
};
use mnet_signup::telemetry;
use std::time::Duration;
use tracing::info;

pub(crate) async fn run_single_signup(args: SingleArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let signup_config = apply_transport_args(config.signup, &args.transport)?;

    let SingleArgs {
        email,
        password,
        signup,
        ..
    } = args;
    let fields = SignupFields {
        gender: Some(signup.gender),
        birth_year: Some(signup.birth_year),
        locale: Some(signup.locale),
        device_name: signup.device_name,
        marketing_terms_version: signup.marketing_terms_version,
        ..SignupFields::new(email, password)
    };

    run_single(fields, &signup_config).await?;
    Ok(())
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let signup_config = apply_transport_args(config.signup, &args.transport)?;

    let defaults = defaults_from_args(&args.signup)?;
    let rows = parse_rows_from_path(&args.csv)?;
    info!(rows = rows.len(), csv = %args.csv.display(), "starting batch");

    let service = HttpSignupService::from_config(&signup_config)?;
    let summary = service.run_batch(rows, &defaults).await;

    println!(
        "Batch complete. Success: {} / {}",
        summary.success, summary.processed
    );
    if summary.skipped > 0 {
        println!("Skipped rows without email or password: {}", summary.skipped);
    }
    Ok(())
}

pub(crate) fn apply_transport_args(
    mut config: SignupConfig,
    args: &TransportArgs,
) -> Result<SignupConfig, AppError> {
    if let Some(secs) = args.timeout {
        config.transport.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = args.retries {
        config.transport.retries = retries;
    }
    if let Some(secs) = args.backoff {
        config.transport.backoff = backoff_from_secs("--backoff", secs)?;
    }
    Ok(config)
}

pub(crate) fn defaults_from_args(args: &SignupArgs) -> Result<SignupDefaults, AppError> {
    let gender = Gender::parse(&args.gender).map_err(SignupError::from)?;
    Ok(SignupDefaults {
        gender,
        birth_year: args.birth_year.clone(),
        locale: args.locale.clone(),
        device_name: args.device_name.clone(),
        marketing_terms_version: args.marketing_terms_version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_flags_override_configuration() {
        let args = TransportArgs {
            timeout: Some(7),
            retries: Some(0),
            backoff: Some(1.5),
        };
        let config = apply_transport_args(SignupConfig::default(), &args).expect("valid flags");
        assert_eq!(config.transport.timeout, Duration::from_secs(7));
        assert_eq!(config.transport.retries, 0);
        assert_eq!(config.transport.backoff, Duration::from_millis(1500));
    }

    #[test]
    fn negative_backoff_is_rejected() {
        let args = TransportArgs {
            backoff: Some(-1.0),
            ..TransportArgs::default()
        };
        assert!(apply_transport_args(SignupConfig::default(), &args).is_err());
    }

    #[test]
    fn signup_flags_become_batch_defaults() {
        let args = SignupArgs {
            locale: "ko".to_string(),
            gender: "f".to_string(),
            birth_year: "1995".to_string(),
            device_name: None,
            marketing_terms_version: Some("2".to_string()),
        };
        let defaults = defaults_from_args(&args).expect("valid defaults");
        assert_eq!(defaults.gender, Gender::Female);
        assert_eq!(defaults.locale, "ko");
        assert_eq!(defaults.marketing_terms_version.as_deref(), Some("2"));
    }
}
