//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod broker;
pub mod commission;
pub mod plot;
pub mod wallet;

pub use broker::{BrokerError, BrokerFilter, BrokerRepository, CreateBrokerInput};
pub use commission::{
    CommissionRepository, DistributionError, DistributionOutcome, ReconcileOutcome,
};
pub use plot::{
    BookPlotInput, CreatePlotInput, PaymentRecorded, PlotError, PlotFilter, PlotRepository,
    RecordPaymentInput, UpdatePlotInput,
};
pub use wallet::{WalletError, WalletRepository, WalletSnapshot};
