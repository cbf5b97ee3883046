//! MARI backend client
//!
//! A `reqwest` implementation of [`Backend`] speaking the backend's JSON API.

use crate::api::Backend;
use crate::api::error::ApiError;
use crate::consts::cli_consts::network;
use crate::environment::Environment;
use crate::models::{
    AppointmentStatus, AuditEntry, CareRecord, DateRange, MapZone, NeighborhoodEntry,
    NewAppointment, NextNumber, RecordSnapshot, RecordSubmission, SearchFilters, ServerReply,
    Statistics, StatusUpdate,
};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("mari-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    environment: Environment,
}

impl ApiClient {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(network::connect_timeout())
            .timeout(network::request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn with_query(endpoint: &str, query: String) -> String {
        if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query)
        }
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(ApiError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let response = Self::handle_response_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        log::debug!("GET {}", url);
        let bytes = self.send(self.client.get(&url)).await?;
        Self::decode_response(&bytes)
    }

    /// Decodes a `{success, message}` reply. Bare 2xx bodies count as success;
    /// `success: false` becomes [`ApiError::Rejected`].
    fn decode_reply(bytes: &[u8]) -> Result<ServerReply, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ServerReply::default());
        }
        let reply: ServerReply = Self::decode_response(bytes)?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(ApiError::Rejected {
                message: reply.message.unwrap_or_default(),
            })
        }
    }

    async fn json_request<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: &B,
    ) -> Result<ServerReply, ApiError> {
        let url = self.build_url(endpoint);
        log::debug!("{} {}", method, url);
        let bytes = self
            .send(self.client.request(method, &url).json(body))
            .await?;
        Self::decode_reply(&bytes)
    }

    async fn delete_request(&self, endpoint: &str) -> Result<ServerReply, ApiError> {
        let url = self.build_url(endpoint);
        log::debug!("DELETE {}", url);
        let bytes = self.send(self.client.delete(&url)).await?;
        Self::decode_reply(&bytes)
    }
}

#[async_trait::async_trait]
impl Backend for ApiClient {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn next_number(&self) -> Result<u32, ApiError> {
        let next: NextNumber = self.get_request("/api/siguiente-numero").await?;
        Ok(next.numero)
    }

    async fn dashboard(&self) -> Result<RecordSnapshot, ApiError> {
        self.get_request("/api/dashboard").await
    }

    async fn search_records(&self, filters: &SearchFilters) -> Result<Vec<CareRecord>, ApiError> {
        let endpoint = Self::with_query("/api/atenciones", filters.to_query_string());
        self.get_request(&endpoint).await
    }

    async fn get_record(&self, record_number: u32) -> Result<CareRecord, ApiError> {
        let value: serde_json::Value = self
            .get_request(&format!("/api/atenciones/{}", record_number))
            .await?;
        // Some deployments answer a miss with 200 and a bare `{message}`.
        if value.get("numero").is_none() {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string);
            return Err(ApiError::NotFound { message });
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn create_record(&self, record: &CareRecord) -> Result<ServerReply, ApiError> {
        let body = RecordSubmission::from(record);
        self.json_request(reqwest::Method::POST, "/api/atenciones", &body)
            .await
    }

    async fn update_record(
        &self,
        record_number: u32,
        record: &CareRecord,
    ) -> Result<ServerReply, ApiError> {
        let body = RecordSubmission::from(record);
        self.json_request(
            reqwest::Method::PUT,
            &format!("/api/atenciones/{}", record_number),
            &body,
        )
        .await
    }

    async fn delete_record(&self, record_number: u32) -> Result<ServerReply, ApiError> {
        self.delete_request(&format!("/api/atenciones/{}", record_number))
            .await
    }

    async fn statistics(&self, range: &DateRange) -> Result<Statistics, ApiError> {
        let endpoint = Self::with_query("/api/estadisticas", range.to_query_string());
        self.get_request(&endpoint).await
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<ServerReply, ApiError> {
        self.json_request(reqwest::Method::POST, "/api/turnos", appointment)
            .await
    }

    async fn update_appointment_status(
        &self,
        id: u64,
        status: AppointmentStatus,
    ) -> Result<ServerReply, ApiError> {
        self.json_request(
            reqwest::Method::PUT,
            &format!("/api/turnos/{}", id),
            &StatusUpdate { estado: status },
        )
        .await
    }

    async fn delete_appointment(&self, id: u64) -> Result<ServerReply, ApiError> {
        self.delete_request(&format!("/api/turnos/{}", id)).await
    }

    async fn audit_log(&self) -> Result<Vec<AuditEntry>, ApiError> {
        self.get_request("/api/auditoria").await
    }

    async fn export(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.build_url("/api/exportar");
        log::debug!("GET {}", url);
        self.send(self.client.get(&url)).await
    }

    async fn map_zones(&self) -> Result<Vec<MapZone>, ApiError> {
        self.get_request("/api/barrios/mapa").await
    }

    async fn create_map_zone(&self, zone: &MapZone) -> Result<ServerReply, ApiError> {
        self.json_request(reqwest::Method::POST, "/api/barrios/mapa", zone)
            .await
    }

    async fn update_map_zone(&self, id: u64, zone: &MapZone) -> Result<ServerReply, ApiError> {
        self.json_request(
            reqwest::Method::PUT,
            &format!("/api/barrios/mapa/{}", id),
            zone,
        )
        .await
    }

    async fn delete_map_zone(&self, id: u64) -> Result<ServerReply, ApiError> {
        self.delete_request(&format!("/api/barrios/mapa/{}", id))
            .await
    }

    async fn neighborhoods(&self) -> Result<Vec<NeighborhoodEntry>, ApiError> {
        self.get_request("/api/barrios/lista").await
    }

    async fn neighborhood_stats(&self) -> Result<HashMap<String, u64>, ApiError> {
        self.get_request("/api/estadisticas/barrios").await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.build_url("/logout");
        self.send(self.client.get(&url)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttentionType;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Environment::Custom {
            api_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn next_number_reads_numero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/siguiente-numero"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"numero": 11})))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).next_number().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn search_sends_only_non_empty_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/atenciones"))
            .and(query_param("especie", "perro"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"numero": 3, "fecha": "2025-11-27", "tipo_atencion": "atencion_primaria",
                 "nombre_animal": "Rocky", "especie": "perro", "sexo": "macho", "edad": "3",
                 "tutor": {"nombre_apellido": "Luis", "dni": "2", "telefono": null,
                           "direccion": null, "barrio": null}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let filters = SearchFilters {
            especie: Some("perro".to_string()),
            dni: Some(String::new()),
            ..Default::default()
        };
        let records = client_for(&server).search_records(&filters).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attention_type, AttentionType::PrimaryCare);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("especie=perro"));
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/atenciones/42"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"success": false, "message": "Registro no encontrado"})),
            )
            .mount(&server)
            .await;

        match client_for(&server).get_record(42).await {
            Err(ApiError::NotFound { message }) => {
                assert_eq!(message.as_deref(), Some("Registro no encontrado"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn gateway_error_page_is_not_a_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_string("<html><body><h1>502 Bad Gateway</h1></body></html>"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).dashboard().await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
        assert_eq!(err.server_message(), None);
        assert_eq!(
            err.user_message("Error al cargar datos del dashboard"),
            "Error al cargar datos del dashboard"
        );
    }

    #[tokio::test]
    async fn create_posts_flattened_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/atenciones"))
            .and(body_json(json!({
                "numero": 10, "fecha": "2025-01-05", "tipo_atencion": "castracion",
                "nombre_animal": "Toby", "especie": "perro", "sexo": "macho", "edad": "",
                "nombre_apellido": "Ana", "dni": "123", "telefono": "", "direccion": "",
                "barrio": "", "motivo": "", "diagnostico": "", "tratamiento": "",
                "derivacion": "", "observaciones": ""
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let record = CareRecord {
            record_number: 10,
            date: "2025-01-05".to_string(),
            animal_name: "Toby".to_string(),
            species: "perro".to_string(),
            sex: "macho".to_string(),
            guardian: crate::models::GuardianInfo {
                full_name: "Ana".to_string(),
                national_id: "123".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let reply = client_for(&server).create_record(&record).await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/atenciones/10"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                json!({"success": false, "message": "Error: El número de registro 10 ya existe"}),
            ))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .update_record(10, &CareRecord::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message("fallback"),
            "Error: El número de registro 10 ya existe"
        );
    }

    #[tokio::test]
    async fn success_false_with_ok_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/atenciones/9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "No se encontró el registro"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).delete_record(9).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
    }

    #[tokio::test]
    async fn appointment_status_update_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/turnos/4"))
            .and(body_json(json!({"estado": "completado"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .update_appointment_status(4, AppointmentStatus::Completed)
            .await
            .unwrap();
        assert!(reply.is_success());
    }

    #[tokio::test]
    async fn statistics_range_goes_into_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/estadisticas"))
            .and(query_param("fecha_desde", "2025-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1, "por_tipo": [["castracion", 1]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let range = DateRange {
            from: Some("2025-01-01".to_string()),
            to: None,
        };
        let stats = client_for(&server).statistics(&range).await.unwrap();
        assert_eq!(stats.total, Some(1));
    }

    #[tokio::test]
    async fn export_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/exportar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
            .mount(&server)
            .await;

        let bytes = client_for(&server).export().await.unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let client = ApiClient::new(Environment::Custom {
            api_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap();
        assert!(matches!(client.dashboard().await, Err(ApiError::Reqwest(_))));
    }
}
