mod cli;
mod commands;
mod form;
mod infra;
mod routes;
mod server;

use mnet_signup::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
