use crate::api::error::ApiError;
use crate::environment::Environment;
use crate::models::{
    AppointmentStatus, AuditEntry, CareRecord, DateRange, MapZone, NeighborhoodEntry,
    NewAppointment, RecordSnapshot, SearchFilters, ServerReply, Statistics,
};
use std::collections::HashMap;

pub(crate) mod client;
pub use client::ApiClient;
pub mod error;

#[cfg(test)]
use mockall::automock;

/// The clinic backend's HTTP+JSON contract.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    fn environment(&self) -> &Environment;

    /// Next free record number.
    async fn next_number(&self) -> Result<u32, ApiError>;

    /// Dashboard aggregate.
    async fn dashboard(&self) -> Result<RecordSnapshot, ApiError>;

    /// Records matching the non-empty filters, in server order.
    async fn search_records(&self, filters: &SearchFilters) -> Result<Vec<CareRecord>, ApiError>;

    /// One record by number. `ApiError::NotFound` when it does not exist.
    async fn get_record(&self, record_number: u32) -> Result<CareRecord, ApiError>;

    async fn create_record(&self, record: &CareRecord) -> Result<ServerReply, ApiError>;

    async fn update_record(
        &self,
        record_number: u32,
        record: &CareRecord,
    ) -> Result<ServerReply, ApiError>;

    async fn delete_record(&self, record_number: u32) -> Result<ServerReply, ApiError>;

    async fn statistics(&self, range: &DateRange) -> Result<Statistics, ApiError>;

    async fn create_appointment(&self, appointment: &NewAppointment)
    -> Result<ServerReply, ApiError>;

    async fn update_appointment_status(
        &self,
        id: u64,
        status: AppointmentStatus,
    ) -> Result<ServerReply, ApiError>;

    async fn delete_appointment(&self, id: u64) -> Result<ServerReply, ApiError>;

    async fn audit_log(&self) -> Result<Vec<AuditEntry>, ApiError>;

    /// Spreadsheet export as raw bytes.
    async fn export(&self) -> Result<Vec<u8>, ApiError>;

    async fn map_zones(&self) -> Result<Vec<MapZone>, ApiError>;

    async fn create_map_zone(&self, zone: &MapZone) -> Result<ServerReply, ApiError>;

    async fn update_map_zone(&self, id: u64, zone: &MapZone) -> Result<ServerReply, ApiError>;

    async fn delete_map_zone(&self, id: u64) -> Result<ServerReply, ApiError>;

    async fn neighborhoods(&self) -> Result<Vec<NeighborhoodEntry>, ApiError>;

    /// Record counts keyed by neighborhood name.
    async fn neighborhood_stats(&self) -> Result<HashMap<String, u64>, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}
