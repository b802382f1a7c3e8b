//! Schema migration runner.
//!
//! Reads `DATABASE_URL` and accepts the standard `sea-orm-migration`
//! subcommands:
//!   migrator up      - apply pending migrations
//!   migrator down    - roll back the last migration
//!   migrator status  - list applied and pending migrations
//!   migrator fresh   - drop everything and re-apply

use sea_orm_migration::prelude::*;
use leavebook_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
