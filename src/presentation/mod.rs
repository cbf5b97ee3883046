//! Presentation models and the record form

pub mod form;
pub mod views;

pub use form::{FormError, FormField, RecordForm};
pub use views::{
    DashboardView, Listing, MapView, SearchView, StatisticsView, audit_view, dashboard_view,
    map_view, neighborhoods_view, record_detail, search_view, statistics_view,
};
