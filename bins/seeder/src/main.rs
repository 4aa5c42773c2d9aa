//! Database seeder for Storebooks development and testing.
//!
//! Seeds a demo company with two stores, a small chart of accounts, cash
//! locations and counterparties. Every row has a fixed ID, so running the
//! seeder twice leaves the data unchanged.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use storebooks_db::entities::{
    accounts, cash_locations, companies, counterparties,
    sea_orm_active_enums::{AccountType, CategoryTag, LocationType},
    stores,
};
use storebooks_shared::AppConfig;
use uuid::Uuid;

/// Demo company that owns every seeded row.
const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
/// Sister company used by the internal counterparty.
const SISTER_COMPANY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

const MAIN_STORE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0001_0001);
const HARBOUR_STORE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0001_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = storebooks_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding companies...");
    seed_companies(&db).await?;

    println!("Seeding stores...");
    seed_stores(&db).await?;

    println!("Seeding chart of accounts...");
    seed_accounts(&db).await?;

    println!("Seeding cash locations...");
    seed_cash_locations(&db).await?;

    println!("Seeding counterparties...");
    seed_counterparties(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Numbers seeded rows within a kind, e.g. `seed_id(0x0002, 3)`.
const fn seed_id(kind: u128, n: u128) -> Uuid {
    Uuid::from_u128((kind << 16) | n)
}

async fn seed_companies(db: &DatabaseConnection) -> anyhow::Result<()> {
    let rows = [
        (DEMO_COMPANY_ID, "Storebooks Demo Retail"),
        (SISTER_COMPANY_ID, "Storebooks Demo Wholesale"),
    ]
    .map(|(id, name)| companies::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        created_at: Set(now()),
    });

    let inserted = companies::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(companies::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    println!("  {inserted} new companies");
    Ok(())
}

async fn seed_stores(db: &DatabaseConnection) -> anyhow::Result<()> {
    let rows = [
        (MAIN_STORE_ID, "Main Street"),
        (HARBOUR_STORE_ID, "Harbour Front"),
    ]
    .map(|(id, name)| stores::ActiveModel {
        id: Set(id),
        company_id: Set(DEMO_COMPANY_ID),
        name: Set(name.to_string()),
        created_at: Set(now()),
    });

    let inserted = stores::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(stores::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    println!("  {inserted} new stores");
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<()> {
    let chart = [
        ("Cash", AccountType::Asset, Some(CategoryTag::Cash)),
        ("Accounts Receivable", AccountType::Asset, Some(CategoryTag::Receivable)),
        ("Store Equipment", AccountType::Asset, Some(CategoryTag::FixedAsset)),
        ("Inventory", AccountType::Asset, None),
        ("Accounts Payable", AccountType::Liability, Some(CategoryTag::Payable)),
        ("Owner's Equity", AccountType::Equity, None),
        ("Sales Revenue", AccountType::Income, None),
        ("Interest Income", AccountType::Income, None),
        ("Cost of Goods Sold", AccountType::Expense, None),
        ("Rent Expense", AccountType::Expense, None),
    ];

    let rows = chart
        .into_iter()
        .zip(1u128..)
        .map(|((name, account_type, category_tag), n)| accounts::ActiveModel {
            id: Set(seed_id(0x0002, n)),
            company_id: Set(DEMO_COMPANY_ID),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            category_tag: Set(category_tag),
            created_at: Set(now()),
        });

    let inserted = accounts::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(accounts::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    println!("  {inserted} new accounts");
    Ok(())
}

async fn seed_cash_locations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let locations = [
        ("Main Street till", Some(MAIN_STORE_ID), LocationType::Cash),
        ("Main Street safe", Some(MAIN_STORE_ID), LocationType::Vault),
        ("Harbour Front till", Some(HARBOUR_STORE_ID), LocationType::Cash),
        ("Operating bank account", None, LocationType::Bank),
    ];

    let rows = locations
        .into_iter()
        .zip(1u128..)
        .map(|((name, store_id, location_type), n)| cash_locations::ActiveModel {
            id: Set(seed_id(0x0003, n)),
            company_id: Set(DEMO_COMPANY_ID),
            store_id: Set(store_id),
            name: Set(name.to_string()),
            location_type: Set(location_type),
            created_at: Set(now()),
        });

    let inserted = cash_locations::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(cash_locations::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    println!("  {inserted} new cash locations");
    Ok(())
}

async fn seed_counterparties(db: &DatabaseConnection) -> anyhow::Result<()> {
    let parties = [
        ("Fresh Farms Supply", false, None),
        ("Corner Cafe", false, None),
        ("Storebooks Demo Wholesale", true, Some(SISTER_COMPANY_ID)),
    ];

    let rows = parties
        .into_iter()
        .zip(1u128..)
        .map(|((name, is_internal, linked_company_id), n)| counterparties::ActiveModel {
            id: Set(seed_id(0x0004, n)),
            company_id: Set(DEMO_COMPANY_ID),
            name: Set(name.to_string()),
            is_internal: Set(is_internal),
            linked_company_id: Set(linked_company_id),
            created_at: Set(now()),
        });

    let inserted = counterparties::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(counterparties::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    println!("  {inserted} new counterparties");
    Ok(())
}
