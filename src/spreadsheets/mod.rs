pub mod export_xlsx;

pub use export_xlsx::{export_portfolio_xlsx, export_rollups_xlsx};
