//! Business logic services for the Palletrack server

pub mod bins;
pub mod export;
pub mod ledger;
pub mod reports;

pub use bins::BinService;
pub use export::ExportService;
pub use ledger::LedgerService;
pub use reports::ReportsService;
