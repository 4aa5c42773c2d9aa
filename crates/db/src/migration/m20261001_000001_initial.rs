//! Initial database migration.
//!
//! Creates enums, reference tables, journal tables and their extension
//! sub-records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE DATA
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(STORES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CASH_LOCATIONS_SQL).await?;
        db.execute_unprepared(COUNTERPARTIES_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: LINE EXTENSIONS
        // ============================================================
        db.execute_unprepared(LINE_EXTENSIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'income', 'expense');

CREATE TYPE category_tag AS ENUM ('cash', 'payable', 'receivable', 'fixed_asset');

CREATE TYPE location_type AS ENUM ('cash', 'vault', 'bank');

CREATE TYPE entry_status AS ENUM ('draft', 'posted');

CREATE TYPE debt_direction AS ENUM ('receivable', 'payable');

CREATE TYPE debt_category AS ENUM ('trade', 'loan', 'other');

CREATE TYPE depreciation_method AS ENUM (
    'straight_line',
    'declining_balance',
    'double_declining'
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const STORES_SQL: &str = r"
CREATE TABLE stores (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, name)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    category_tag category_tag,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (company_id, name)
);

CREATE INDEX idx_accounts_company ON accounts(company_id);
";

const CASH_LOCATIONS_SQL: &str = r"
CREATE TABLE cash_locations (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    store_id UUID REFERENCES stores(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    location_type location_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cash_locations_company_store ON cash_locations(company_id, store_id);
";

const COUNTERPARTIES_SQL: &str = r"
CREATE TABLE counterparties (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    is_internal BOOLEAN NOT NULL DEFAULT false,
    linked_company_id UUID REFERENCES companies(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_internal_link CHECK (is_internal OR linked_company_id IS NULL)
);

CREATE INDEX idx_counterparties_company ON counterparties(company_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    store_id UUID REFERENCES stores(id),
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    counterparty_id UUID REFERENCES counterparties(id),
    cash_location_id UUID REFERENCES cash_locations(id),
    counterparty_cash_location_id UUID REFERENCES cash_locations(id),
    base_amount NUMERIC(19, 4) NOT NULL,
    status entry_status NOT NULL DEFAULT 'draft',
    idempotency_key UUID NOT NULL UNIQUE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_base_amount CHECK (base_amount >= 0)
);

CREATE INDEX idx_journal_entries_company_date ON journal_entries(company_id, entry_date);
CREATE INDEX idx_journal_entries_drafts ON journal_entries(company_id, updated_at) WHERE status = 'draft';
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    description TEXT NOT NULL DEFAULT '',
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (journal_entry_id, line_no),
    CONSTRAINT chk_amounts_non_negative CHECK (debit >= 0 AND credit >= 0)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const LINE_EXTENSIONS_SQL: &str = r"
CREATE TABLE journal_line_cash (
    journal_line_id UUID PRIMARY KEY REFERENCES journal_lines(id) ON DELETE CASCADE,
    cash_location_id UUID NOT NULL REFERENCES cash_locations(id)
);

CREATE TABLE journal_line_debts (
    journal_line_id UUID PRIMARY KEY REFERENCES journal_lines(id) ON DELETE CASCADE,
    direction debt_direction NOT NULL,
    category debt_category NOT NULL,
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    interest_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    interest_account_id UUID REFERENCES accounts(id),
    interest_due_day SMALLINT,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id),
    linked_store_id UUID REFERENCES stores(id),
    counterparty_cash_location_id UUID REFERENCES cash_locations(id)
);

CREATE TABLE journal_line_fixed_assets (
    journal_line_id UUID PRIMARY KEY REFERENCES journal_lines(id) ON DELETE CASCADE,
    asset_name VARCHAR(255) NOT NULL,
    acquisition_date DATE NOT NULL,
    acquisition_cost NUMERIC(19, 4) NOT NULL,
    useful_life_years INTEGER NOT NULL,
    salvage_value NUMERIC(19, 4) NOT NULL DEFAULT 0,
    depreciation_method depreciation_method NOT NULL
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS journal_line_fixed_assets CASCADE;
DROP TABLE IF EXISTS journal_line_debts CASCADE;
DROP TABLE IF EXISTS journal_line_cash CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS counterparties CASCADE;
DROP TABLE IF EXISTS cash_locations CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS stores CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

DROP TYPE IF EXISTS depreciation_method;
DROP TYPE IF EXISTS debt_category;
DROP TYPE IF EXISTS debt_direction;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS location_type;
DROP TYPE IF EXISTS category_tag;
DROP TYPE IF EXISTS account_type;
";
