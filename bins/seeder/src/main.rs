//! Development data seeder.
//!
//! Seeds roles with their grants, leave types, a default policy, public
//! holidays and three demo users (HR admin, manager, employee). Every row
//! has a fixed id, so running the seeder twice is harmless. When the
//! application configuration loads, a bearer token is printed per demo user.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;
use uuid::Uuid;

use leavebook_db::entities::{
    leave_policies, leave_types, public_holidays, role_permissions, roles, user_roles, users,
};
use leavebook_shared::{AppConfig, JwtConfig, JwtService};

const DEFAULT_POLICY_ID: Uuid = Uuid::from_u128(0x1000);

const ROLE_EMPLOYEE: Uuid = Uuid::from_u128(0x2001);
const ROLE_MANAGER: Uuid = Uuid::from_u128(0x2002);
const ROLE_HR_ADMIN: Uuid = Uuid::from_u128(0x2003);

const LEAVE_ANNUAL: Uuid = Uuid::from_u128(0x3001);
const LEAVE_SICK: Uuid = Uuid::from_u128(0x3002);
const LEAVE_UNPAID: Uuid = Uuid::from_u128(0x3003);

const USER_HR: Uuid = Uuid::from_u128(0x4001);
const USER_MANAGER: Uuid = Uuid::from_u128(0x4002);
const USER_EMPLOYEE: Uuid = Uuid::from_u128(0x4003);

type Grant = (&'static str, &'static str, Option<&'static str>);

const EMPLOYEE_GRANTS: &[Grant] = &[
    ("leave_requests", "create", Some("own_records_only")),
    ("leave_requests", "read", Some("own_records_only")),
    ("leave_balances", "read", Some("own_records_only")),
];

const MANAGER_GRANTS: &[Grant] = &[
    ("leave_requests", "create", Some("own_records_only")),
    ("leave_requests", "read", Some("own_records_only")),
    ("leave_requests", "read", Some("direct_reports_only")),
    ("leave_requests", "approve", Some("direct_reports_only")),
    ("leave_balances", "read", Some("own_records_only")),
    ("leave_balances", "read", Some("direct_reports_only")),
];

const HR_ADMIN_GRANTS: &[Grant] = &[
    ("leave_requests", "create", None),
    ("leave_requests", "read", None),
    ("leave_requests", "approve", None),
    ("leave_requests", "delete", None),
    ("leave_balances", "read", None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("LEAVEBOOK__DATABASE__URL"))
        .context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = leavebook_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding roles...");
    seed_role(&db, ROLE_EMPLOYEE, "employee", EMPLOYEE_GRANTS).await?;
    seed_role(&db, ROLE_MANAGER, "manager", MANAGER_GRANTS).await?;
    seed_role(&db, ROLE_HR_ADMIN, "hr_admin", HR_ADMIN_GRANTS).await?;

    println!("Seeding leave types...");
    seed_leave_type(&db, LEAVE_ANNUAL, "ANNUAL", "Annual leave").await?;
    seed_leave_type(&db, LEAVE_SICK, "SICK", "Sick leave").await?;
    seed_leave_type(&db, LEAVE_UNPAID, "UNPAID", "Unpaid leave").await?;

    println!("Seeding default policy...");
    seed_default_policy(&db).await?;

    println!("Seeding public holidays...");
    let year = Utc::now().year();
    for y in [year, year + 1] {
        seed_holidays(&db, y).await?;
    }

    println!("Seeding demo users...");
    seed_user(&db, USER_HR, "hr@leavebook.dev", "Hana Reyes", None, ROLE_HR_ADMIN).await?;
    seed_user(
        &db,
        USER_MANAGER,
        "manager@leavebook.dev",
        "Milo Park",
        None,
        ROLE_MANAGER,
    )
    .await?;
    seed_user(
        &db,
        USER_EMPLOYEE,
        "employee@leavebook.dev",
        "Eda Novak",
        Some(USER_MANAGER),
        ROLE_EMPLOYEE,
    )
    .await?;

    print_tokens();

    println!("Seeding complete!");
    Ok(())
}

async fn seed_role(
    db: &DatabaseConnection,
    id: Uuid,
    name: &str,
    grants: &[Grant],
) -> anyhow::Result<()> {
    if roles::Entity::find_by_id(id).one(db).await?.is_some() {
        println!("  Role {name} already exists, skipping...");
        return Ok(());
    }

    roles::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert role {name}"))?;

    for (resource, action, condition) in grants {
        role_permissions::ActiveModel {
            id: Set(Uuid::new_v4()),
            role_id: Set(id),
            resource: Set((*resource).to_string()),
            action: Set((*action).to_string()),
            condition: Set(condition.map(str::to_string)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    println!("  Created role {name} with {} grants", grants.len());
    Ok(())
}

async fn seed_leave_type(
    db: &DatabaseConnection,
    id: Uuid,
    code: &str,
    name: &str,
) -> anyhow::Result<()> {
    if leave_types::Entity::find_by_id(id).one(db).await?.is_some() {
        println!("  Leave type {code} already exists, skipping...");
        return Ok(());
    }

    leave_types::ActiveModel {
        id: Set(id),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert leave type {code}"))?;
    println!("  Created leave type {code}");
    Ok(())
}

async fn seed_default_policy(db: &DatabaseConnection) -> anyhow::Result<()> {
    if leave_policies::Entity::find_by_id(DEFAULT_POLICY_ID)
        .one(db)
        .await?
        .is_some()
    {
        println!("  Default policy already exists, skipping...");
        return Ok(());
    }

    // Zero allowance leaves a type uncapped.
    let rules = json!({
        "ANNUAL": {
            "yearly_allowance_hours": "200",
            "carry_over": { "max_hours": "40", "expires_after_months": 3 },
            "request_rules": { "min_notice_days": 2, "max_consecutive_hours": "120" }
        },
        "SICK": {
            "yearly_allowance_hours": "0",
            "request_rules": { "requires_approval": false, "document_required_over_hours": "24" }
        },
        "UNPAID": { "yearly_allowance_hours": "0" }
    });

    leave_policies::ActiveModel {
        id: Set(DEFAULT_POLICY_ID),
        name: Set("Default".to_string()),
        is_default: Set(true),
        rules: Set(rules),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("failed to insert default policy")?;
    println!("  Created default policy");
    Ok(())
}

/// Holidays without a region apply everywhere.
async fn seed_holidays(db: &DatabaseConnection, year: i32) -> anyhow::Result<()> {
    let days = [
        (1, 1, "New Year's Day"),
        (5, 1, "Labour Day"),
        (12, 25, "Christmas Day"),
        (12, 26, "Boxing Day"),
    ];

    for (month, day, name) in days {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, date.to_string().as_bytes());
        if public_holidays::Entity::find_by_id(id).one(db).await?.is_some() {
            continue;
        }
        public_holidays::ActiveModel {
            id: Set(id),
            date: Set(date),
            name: Set(name.to_string()),
            region: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  Created holiday {date} {name}");
    }
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    id: Uuid,
    email: &str,
    full_name: &str,
    manager_id: Option<Uuid>,
    role_id: Uuid,
) -> anyhow::Result<()> {
    if users::Entity::find_by_id(id).one(db).await?.is_some() {
        println!("  User {email} already exists, skipping...");
        return Ok(());
    }

    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        manager_id: Set(manager_id),
        region: Set(None),
        policy_id: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .with_context(|| format!("failed to insert user {email}"))?;

    user_roles::ActiveModel {
        user_id: Set(id),
        role_id: Set(role_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    println!("  Created user {email} ({id})");
    Ok(())
}

fn print_tokens() {
    let Ok(config) = AppConfig::load() else {
        println!("No application configuration found, skipping demo tokens");
        return;
    };
    let jwt = JwtService::new(JwtConfig::from(&config.jwt));

    println!("Demo bearer tokens:");
    for (label, id) in [
        ("hr", USER_HR),
        ("manager", USER_MANAGER),
        ("employee", USER_EMPLOYEE),
    ] {
        match jwt.generate_access_token(id) {
            Ok(token) => println!("  {label}: {token}"),
            Err(e) => eprintln!("  {label}: failed to generate token: {e}"),
        }
    }
}
