pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod form;
pub mod locale;
pub mod model;
pub mod pdf;
pub mod session;
pub mod store;
pub mod totals;
pub mod view;

pub use config::{Config, StrategyKind};
pub use error::{RacunError, Result};
pub use export::{export_file_name, DirectRender, ExportReport, ExportStrategy, RasterPaginate, SnapshotRasterizer};
pub use form::{FieldEdit, InvoiceForm};
pub use model::{Guest, Host, Invoice, InvoiceRecords, Reservation};
pub use session::Session;
pub use store::{FieldStore, SyncOutcome};
pub use totals::Totals;
pub use view::InvoiceView;
