pub mod empresa_import;
pub mod geografia_backup;
pub mod ticket_service;

pub use empresa_import::{EmpresaImportService, ImportSummary};
pub use geografia_backup::{GeoSnapshot, GeografiaBackupService, RestoreReport, SnapshotError};
pub use ticket_service::{TicketError, TicketService};
