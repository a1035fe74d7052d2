//! Read side of the armory: filtering, search, pagination. Never mutates.

mod service;

pub use service::{
    AssetFilter, AssignmentFilter, HandoverFilter, MaintenanceFilter, Page, QueryService,
};
