use anyhow::Context;
use bb8_postgres::bb8::Pool;
use bb8_postgres::tokio_postgres::NoTls;
use bb8_postgres::PostgresConnectionManager;
use clap::Parser;
use dotenv::dotenv;

use crate::config::Config;

pub mod config;
pub mod controller;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let manager = PostgresConnectionManager::new_from_stringlike(&config.database_url, NoTls)
        .context("Invalid database connection string")?;

    // Connections are established lazily; requests that arrive before the
    // store can hand one out get a retryable 503 from the handlers.
    let postgres_connection = Pool::builder()
        .build(manager)
        .await
        .context("Error building the postgres connection pool")?;

    controller::serve(postgres_connection, &config).await
}
