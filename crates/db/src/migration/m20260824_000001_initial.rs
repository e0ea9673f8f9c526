//! Initial database migration.
//!
//! Creates all enums, tables, and indexes for the plot sales and
//! commission backend.

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
        // PART 2: BROKER NETWORK
        // ============================================================
        db.execute_unprepared(BROKERS_SQL).await?;

        // ============================================================
        // PART 3: PLOT INVENTORY & PAYMENTS
        // ============================================================
        db.execute_unprepared(PLOTS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: WALLETS & WALLET LEDGER
        // ============================================================
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(WALLET_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 5: WITHDRAWALS
        // ============================================================
        db.execute_unprepared(WITHDRAWAL_REQUESTS_SQL).await?;

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
-- Plot lifecycle status
CREATE TYPE plot_status AS ENUM (
    'available',
    'booked',
    'sold',
    'cancelled'
);

-- Commission payout state for a sold plot
CREATE TYPE commission_status AS ENUM ('pending', 'paid');

-- Wallet ledger entry kind
CREATE TYPE wallet_txn_kind AS ENUM (
    'commission',
    'withdrawal',
    'adjustment'
);

-- Withdrawal request workflow status
CREATE TYPE withdrawal_status AS ENUM (
    'pending',
    'approved',
    'rejected'
);
";

const BROKERS_SQL: &str = r"
CREATE TABLE brokers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    upline_id UUID REFERENCES brokers(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_broker_not_own_upline CHECK (upline_id IS DISTINCT FROM id)
);

CREATE INDEX idx_brokers_upline ON brokers(upline_id);
CREATE INDEX idx_brokers_active_name ON brokers(name) WHERE is_active = true;
";

const PLOTS_SQL: &str = r"
CREATE TABLE plots (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project VARCHAR(255) NOT NULL,
    plot_number VARCHAR(100) NOT NULL,
    area_sqft NUMERIC(12, 2),
    description TEXT,
    status plot_status NOT NULL DEFAULT 'available',
    total_amount NUMERIC(19, 4),
    booking_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    remaining_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    paid_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    broker_id UUID REFERENCES brokers(id),
    buyer_name VARCHAR(255),
    commission_status commission_status NOT NULL DEFAULT 'pending',
    booked_at TIMESTAMPTZ,
    sold_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (project, plot_number),
    CONSTRAINT chk_plot_total_amount CHECK (total_amount IS NULL OR total_amount > 0),
    CONSTRAINT chk_plot_booking_amount CHECK (booking_amount >= 0)
);

CREATE INDEX idx_plots_project_status ON plots(project, status);
CREATE INDEX idx_plots_broker ON plots(broker_id);
CREATE INDEX idx_plots_commission_due ON plots(sold_at) WHERE status = 'sold' AND commission_status = 'pending';
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    plot_id UUID NOT NULL REFERENCES plots(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL,
    paid_on DATE NOT NULL,
    method VARCHAR(50),
    notes TEXT,
    voided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_plot_date ON payments(plot_id, paid_on);
CREATE INDEX idx_payments_live ON payments(plot_id) WHERE voided_at IS NULL;
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    broker_id UUID PRIMARY KEY REFERENCES brokers(id) ON DELETE CASCADE,
    total_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    direct_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    downline_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_wallet_total CHECK (total_balance = direct_balance + downline_balance),
    CONSTRAINT chk_wallet_non_negative CHECK (direct_balance >= 0 AND downline_balance >= 0)
);
";

const WALLET_TRANSACTIONS_SQL: &str = r"
CREATE TABLE wallet_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    broker_id UUID NOT NULL REFERENCES brokers(id) ON DELETE CASCADE,
    kind wallet_txn_kind NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    plot_id UUID REFERENCES plots(id),
    level SMALLINT,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_wallet_txn_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_wallet_txn_broker_date ON wallet_transactions(broker_id, created_at);

-- Backstop against double-crediting the same commission: one commission
-- row per (plot, broker, level), enforced even if application-level
-- guards are bypassed.
CREATE UNIQUE INDEX uq_wallet_txn_commission ON wallet_transactions(plot_id, broker_id, level) WHERE kind = 'commission';
";

const WITHDRAWAL_REQUESTS_SQL: &str = r"
CREATE TABLE withdrawal_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    broker_id UUID NOT NULL REFERENCES brokers(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL,
    status withdrawal_status NOT NULL DEFAULT 'pending',
    notes TEXT,
    requested_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    decided_at TIMESTAMPTZ,
    CONSTRAINT chk_withdrawal_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_withdrawals_broker_date ON withdrawal_requests(broker_id, requested_at);
CREATE INDEX idx_withdrawals_pending ON withdrawal_requests(requested_at) WHERE status = 'pending';
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS withdrawal_requests CASCADE;
DROP TABLE IF EXISTS wallet_transactions CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS plots CASCADE;
DROP TABLE IF EXISTS brokers CASCADE;

-- Drop enums
DROP TYPE IF EXISTS withdrawal_status;
DROP TYPE IF EXISTS wallet_txn_kind;
DROP TYPE IF EXISTS commission_status;
DROP TYPE IF EXISTS plot_status;
";
