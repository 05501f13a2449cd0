mod cli;
mod infra;
mod recommend;
mod routes;
mod server;

use youth_policy::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
