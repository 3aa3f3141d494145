//! Entity Screens
//!
//! Screen state over the table gateway: projects, units, additional works,
//! project parameters and the per-project work-order table.
//!
//! A failed remote call leaves local state untouched, logs the error and
//! queues a user-facing notice. Nothing is retried.

mod additional_works;
mod notice;
mod parameters;
mod projects;
mod remote_list;
mod units;
mod work_order;


pub use additional_works::{AdditionalWorksScreen, NewWork, WorkPatch};
pub use notice::{Notice, NoticeLevel, Notices};
pub use parameters::ProjectParametersScreen;
pub use projects::{NewProject, ProjectPatch, ProjectsScreen};
pub use remote_list::{LoadTicket, RemoteList};
pub use units::{NewUnit, UnitPatch, UnitsScreen};
pub use work_order::{WorkOrderScreen, DEFAULT_COLUMN_NAMES};

use crate::domain::GatewayError;

/// Log a failed remote call and queue its user-facing message
fn report_failure(notices: &mut Notices, message: &str, err: &GatewayError) {
    log::error!("{}: {}", message, err);
    notices.error(message);
}
