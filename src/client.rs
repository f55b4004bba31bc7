//! Typed HTTP client for the attendance API.
//!
//! Mirrors the calls a dashboard makes: only filters that are set end up in
//! the query string, and non-2xx answers carry the server's `error` message.

use crate::{
    api::attendance::DeleteResponse,
    model::attendance::{
        AttendanceFilter, AttendanceRecord, DailyDetail, DetailFilter, HistoryFilter,
        NewAttendance, PeriodSummary,
    },
};
use derive_more::Display;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use std::env;

#[derive(Debug, Display)]
pub enum ClientError {
    #[display(fmt = "ATTENDANCE_API_URL must be set")]
    MissingBaseUrl,

    #[display(fmt = "invalid base URL: {}", _0)]
    InvalidBaseUrl(String),

    #[display(fmt = "request failed: {}", _0)]
    Http(reqwest::Error),

    #[display(fmt = "API error {}: {}", status, message)]
    Api { status: u16, message: String },
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct AttendanceClient {
    http: Client,
    base_url: String,
}

impl AttendanceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Reads the base URL from `ATTENDANCE_API_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        env::var("ATTENDANCE_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
            .ok_or(ClientError::MissingBaseUrl)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/attendance/{route}/{employee_id}` with the id escaped as one segment.
    fn employee_url(&self, route: &str, employee_id: &str) -> Result<Url, ClientError> {
        let invalid = || ClientError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["attendance", route, employee_id]);
        Ok(url)
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, ClientError> {
        let request = self
            .http
            .get(self.url("/attendance"))
            .query(&filter.query_pairs());
        send(request).await
    }

    pub async fn create(&self, entry: &NewAttendance) -> Result<AttendanceRecord, ClientError> {
        send(self.http.post(self.url("/attendance")).json(entry)).await
    }

    pub async fn delete(&self, id: u64) -> Result<DeleteResponse, ClientError> {
        send(self.http.delete(self.url(&format!("/attendance/{id}")))).await
    }

    pub async fn employee_history(
        &self,
        employee_id: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<PeriodSummary>, ClientError> {
        let request = self
            .http
            .get(self.employee_url("employee-history", employee_id)?)
            .query(&filter.query_pairs());
        send(request).await
    }

    pub async fn employee_details(
        &self,
        employee_id: &str,
        filter: &DetailFilter,
    ) -> Result<Vec<DailyDetail>, ClientError> {
        let request = self
            .http
            .get(self.employee_url("employee-details", employee_id)?)
            .query(&filter.query_pairs());
        send(request).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = AttendanceClient::new("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/attendance"), "http://localhost:8080/api/attendance");
    }

    #[test]
    fn employee_ids_are_escaped_as_one_segment() {
        let client = AttendanceClient::new("http://localhost:8080/api/");
        let url = client.employee_url("employee-history", "EMP-001").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/attendance/employee-history/EMP-001");

        let url = client.employee_url("employee-details", "a b/c").unwrap();
        assert_eq!(url.path(), "/api/attendance/employee-details/a%20b%2Fc");

        let bare = AttendanceClient::new("http://localhost:8080");
        let url = bare.employee_url("employee-history", "E1").unwrap();
        assert_eq!(url.path(), "/attendance/employee-history/E1");
    }

    #[test]
    fn unusable_base_url_is_reported() {
        let client = AttendanceClient::new("not a url");
        assert!(matches!(
            client.employee_url("employee-history", "E1"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
