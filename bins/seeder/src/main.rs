//! Database seeder for Plotbook development and testing.
//!
//! Seeds a broker referral chain, demo plot inventory, and one booked
//! plot with a part payment for local development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use plotbook_db::entities::{
    brokers, payments, plots,
    sea_orm_active_enums::{CommissionStatus, PlotStatus},
};

/// Root broker of the demo referral chain (consistent for all seeds)
const DEMO_BROKER_C_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Mid-level broker, referred by C
const DEMO_BROKER_B_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Selling broker, referred by B
const DEMO_BROKER_A_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Booked demo plot (consistent so the part payment can reference it)
const DEMO_BOOKED_PLOT_ID: &str = "00000000-0000-0000-0000-000000000010";
/// Part payment on the booked demo plot
const DEMO_PAYMENT_ID: &str = "00000000-0000-0000-0000-000000000011";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = plotbook_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding brokers...");
    seed_brokers(&db).await;

    println!("Seeding plot inventory...");
    seed_plots(&db).await;

    println!("Seeding booked plot with part payment...");
    seed_booked_plot(&db).await;

    println!("Seeding complete!");
}

fn broker_c_id() -> Uuid {
    Uuid::parse_str(DEMO_BROKER_C_ID).unwrap()
}

fn broker_b_id() -> Uuid {
    Uuid::parse_str(DEMO_BROKER_B_ID).unwrap()
}

fn broker_a_id() -> Uuid {
    Uuid::parse_str(DEMO_BROKER_A_ID).unwrap()
}

fn booked_plot_id() -> Uuid {
    Uuid::parse_str(DEMO_BOOKED_PLOT_ID).unwrap()
}

fn demo_payment_id() -> Uuid {
    Uuid::parse_str(DEMO_PAYMENT_ID).unwrap()
}

/// Seeds a three-level broker referral chain: C <- B <- A.
async fn seed_brokers(db: &DatabaseConnection) {
    // Root first so upline references resolve
    let brokers_data = [
        (broker_c_id(), "Citra Lestari", "+62 812-0000-0003", None),
        (
            broker_b_id(),
            "Budi Santoso",
            "+62 812-0000-0002",
            Some(broker_c_id()),
        ),
        (
            broker_a_id(),
            "Agus Wijaya",
            "+62 812-0000-0001",
            Some(broker_b_id()),
        ),
    ];

    for (id, name, phone, upline_id) in brokers_data {
        if brokers::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Broker {name} already exists, skipping...");
            continue;
        }

        let broker = brokers::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            phone: Set(Some(phone.to_string())),
            upline_id: Set(upline_id),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = broker.insert(db).await {
            eprintln!("Failed to insert broker {name}: {e}");
        } else {
            println!("  Created broker: {name}");
        }
    }
}

/// Seeds available plots across two demo projects.
async fn seed_plots(db: &DatabaseConnection) {
    // (project, plot_number, area_sqft, total_amount); empty total means unpriced
    let plots_data = [
        ("Sunrise Gardens", "A-01", "1200", "450000"),
        ("Sunrise Gardens", "A-02", "1200", "450000"),
        ("Sunrise Gardens", "A-03", "1450.50", "540000"),
        ("Sunrise Gardens", "B-01", "2000", "760000"),
        ("Sunrise Gardens", "B-02", "2000", ""),
        ("Hilltop Meadows", "H-101", "1750", "625000"),
        ("Hilltop Meadows", "H-102", "1750", "625000"),
        ("Hilltop Meadows", "H-201", "3200", "1150000"),
    ];

    let mut inserted = 0;
    for (project, plot_number, area, total) in plots_data {
        let total_amount = if total.is_empty() {
            None
        } else {
            Some(Decimal::from_str(total).unwrap())
        };

        let plot = plots::ActiveModel {
            id: Set(Uuid::new_v4()),
            project: Set(project.to_string()),
            plot_number: Set(plot_number.to_string()),
            area_sqft: Set(Some(Decimal::from_str(area).unwrap())),
            description: Set(None),
            status: Set(PlotStatus::Available),
            total_amount: Set(total_amount),
            booking_amount: Set(Decimal::ZERO),
            remaining_amount: Set(total_amount.unwrap_or(Decimal::ZERO)),
            paid_percent: Set(Decimal::ZERO),
            broker_id: Set(None),
            buyer_name: Set(None),
            commission_status: Set(CommissionStatus::Pending),
            booked_at: Set(None),
            sold_at: Set(None),
            cancelled_at: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = plot.insert(db).await {
            // Ignore duplicate key errors (plot already seeded)
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert plot {project} {plot_number}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} plots");
}

/// Seeds one booked plot sold through broker A, 20% paid.
///
/// Total 1,200,000 with a 120,000 booking and a 120,000 part payment,
/// leaving 960,000 outstanding. Progress stays below the 50% sale
/// trigger so the demo data keeps a plot in the booked state.
async fn seed_booked_plot(db: &DatabaseConnection) {
    if plots::Entity::find_by_id(booked_plot_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Booked demo plot already exists, skipping...");
        return;
    }

    let total = Decimal::from(1_200_000);
    let booking = Decimal::from(120_000);
    let payment = Decimal::from(120_000);

    let plot = plots::ActiveModel {
        id: Set(booked_plot_id()),
        project: Set("Sunrise Gardens".to_string()),
        plot_number: Set("B-07".to_string()),
        area_sqft: Set(Some(Decimal::from(2400))),
        description: Set(Some("Corner plot facing the lake".to_string())),
        status: Set(PlotStatus::Booked),
        total_amount: Set(Some(total)),
        booking_amount: Set(booking),
        remaining_amount: Set(total - booking - payment),
        paid_percent: Set(Decimal::from(20)),
        broker_id: Set(Some(broker_a_id())),
        buyer_name: Set(Some("Dewi Anggraini".to_string())),
        commission_status: Set(CommissionStatus::Pending),
        booked_at: Set(Some(Utc::now().into())),
        sold_at: Set(None),
        cancelled_at: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = plot.insert(db).await {
        eprintln!("Failed to insert booked demo plot: {e}");
        return;
    }
    println!("  Created booked plot: Sunrise Gardens B-07");

    let part_payment = payments::ActiveModel {
        id: Set(demo_payment_id()),
        plot_id: Set(booked_plot_id()),
        amount: Set(payment),
        paid_on: Set(Utc::now().date_naive()),
        method: Set(Some("bank_transfer".to_string())),
        notes: Set(Some("First installment".to_string())),
        voided_at: Set(None),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = part_payment.insert(db).await {
        eprintln!("Failed to insert part payment: {e}");
    } else {
        println!("  Created part payment: 120000 on Sunrise Gardens B-07");
    }
}
