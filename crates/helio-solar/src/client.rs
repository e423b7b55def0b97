//! SEMS-style portal session client.
//!
//! Every operation logs in fresh: the portal token lives for one logical
//! session and is never persisted.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::instrument;

use crate::error::SolarError;
use crate::plants::{collect_plants, Plant};
use crate::snapshot::{build_snapshot, PlantSnapshot};
use crate::token::extract_token;

const GLOBAL_BASE: &str = "https://www.semsportal.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LOGIN_PATH: &str = "/api/v2/Common/CrossLogin";

/// Pre-login token header the portal expects on the login call.
const PRELOGIN_TOKEN: &str = r#"{"version":"v2.1.0","client":"ios","language":"en"}"#;

/// Station-list route variants, in the order they are tried. Different
/// portal forks expose different routes; a variant that answers with an
/// error is skipped, not fatal.
const STATION_LIST_PATHS: &[&str] = &[
    "/api/PowerStationMonitor/QueryPowerStationMonitor",
    "/api/v2/PowerStation/GetPowerStationListByUser",
    "/api/v1/PowerStation/GetPowerStationList",
];

const POWERFLOW_PATH: &str = "/api/v2/PowerStation/GetPowerflow";
const PLANT_DETAIL_PATH: &str = "/api/v2/PowerStation/GetPlantDetailByPowerstationId";
const INVERTER_PATH: &str = "/api/v2/PowerStation/GetInverterAllPoint";

/// Portal client bound to one region's base URL.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    /// Region code selects the portal host ("eu" -> eu.semsportal.com and
    /// so on); anything unrecognized lands on the global host.
    pub fn new(region: &str) -> Self {
        let base_url = match region.trim().to_lowercase().as_str() {
            "eu" => "https://eu.semsportal.com".to_string(),
            "us" => "https://us.semsportal.com".to_string(),
            "au" => "https://au.semsportal.com".to_string(),
            _ => GLOBAL_BASE.to_string(),
        };
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Log in and extract a session token. A rejected login or a response
    /// with no extractable token is fatal for the calling operation.
    async fn login(&self, account: &str, password: &str) -> Result<String, SolarError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("Token", PRELOGIN_TOKEN)
            .json(&json!({"account": account, "pwd": password}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SolarError::LoginFailed(format!(
                "portal answered {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SolarError::LoginFailed(format!("unreadable login response: {}", e)))?;

        // Forks wrap the session payload under "data"; others answer flat.
        let auth = body.get("data").filter(|v| !v.is_null()).unwrap_or(&body);
        if auth.is_null() {
            return Err(SolarError::LoginFailed("empty login response".to_string()));
        }

        extract_token(auth).ok_or(SolarError::TokenMissing)
    }

    async fn post_with_token(
        &self,
        path: &str,
        token: &str,
        body: Value,
    ) -> Result<Value, SolarError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("Token", token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolarError::Api(format!("{} answered {}", path, status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SolarError::Api(format!("{} returned undecodable body: {}", path, e)))?;

        // Unwrap the usual {code, data} envelope when present.
        match payload.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Ok(payload),
        }
    }

    /// Log in and list the account's power stations.
    ///
    /// Tries each station-list route variant until one yields a non-empty
    /// normalized list. If none does, the (possibly empty) list is returned
    /// together with the token anyway: login success is not listing success.
    #[instrument(skip(self, password), level = "info")]
    pub async fn list_plants(
        &self,
        account: &str,
        password: &str,
    ) -> Result<(Vec<Plant>, String), SolarError> {
        let token = self.login(account, password).await?;

        for path in STATION_LIST_PATHS {
            match self.post_with_token(path, &token, json!({})).await {
                Ok(response) => {
                    let plants = collect_plants(&response);
                    if !plants.is_empty() {
                        tracing::info!("Listed {} plants via {}", plants.len(), path);
                        return Ok((plants, token));
                    }
                }
                Err(e) => {
                    tracing::debug!("Station-list variant {} skipped: {}", path, e);
                }
            }
        }

        tracing::warn!("No station-list variant yielded plants");
        Ok((Vec::new(), token))
    }

    /// Log in and load the collated snapshot of one plant.
    ///
    /// The three sub-resources are fetched independently; a failed fetch
    /// degrades its slice of the snapshot instead of failing the call.
    #[instrument(skip(self, password), level = "info")]
    pub async fn load_collated(
        &self,
        account: &str,
        password: &str,
        plant_id: &str,
    ) -> Result<(PlantSnapshot, String), SolarError> {
        let token = self.login(account, password).await?;

        let powerflow = self
            .post_with_token(POWERFLOW_PATH, &token, json!({"PowerStationId": plant_id}))
            .await
            .map_err(|e| tracing::debug!("Powerflow fetch degraded: {}", e))
            .ok();
        let details = self
            .post_with_token(
                PLANT_DETAIL_PATH,
                &token,
                json!({"powerStationId": plant_id}),
            )
            .await
            .map_err(|e| tracing::debug!("Plant-detail fetch degraded: {}", e))
            .ok();
        let inverters = self
            .post_with_token(INVERTER_PATH, &token, json!({"powerStationId": plant_id}))
            .await
            .map_err(|e| tracing::debug!("Inverter fetch degraded: {}", e))
            .ok();

        let snapshot = build_snapshot(powerflow.as_ref(), details.as_ref(), inverters.as_ref());
        Ok((snapshot, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_login(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_token_from_nested_data() {
        let server = MockServer::start().await;
        mount_login(
            &server,
            serde_json::json!({"data": {"token": "tok-1"}}),
        )
        .await;
        // No listing route mounted: every variant 404s, skipped.
        let client = PortalClient::with_base_url(&server.uri());

        let (plants, token) = client.list_plants("user", "pass").await.unwrap();
        assert!(plants.is_empty());
        assert_eq!(token, "tok-1");
    }

    #[tokio::test]
    async fn test_login_without_token_is_fatal() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"data": {"uid": "u"}})).await;
        let client = PortalClient::with_base_url(&server.uri());

        let err = client.list_plants("user", "pass").await.unwrap_err();
        assert!(matches!(err, SolarError::TokenMissing));
    }

    #[tokio::test]
    async fn test_rejected_login_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let client = PortalClient::with_base_url(&server.uri());

        let err = client.list_plants("user", "bad").await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_listing_skips_failing_variants() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!({"token": "tok-2"})).await;

        // First variant errors, second answers with a wrapped list.
        Mock::given(method("POST"))
            .and(path(STATION_LIST_PATHS[0]))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(STATION_LIST_PATHS[1]))
            .and(header("Token", "tok-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "list": [
                        {"powerstation_id": "ps-1", "plant_name": "Casa", "capacity": 5.0}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = PortalClient::with_base_url(&server.uri());
        let (plants, token) = client.list_plants("user", "pass").await.unwrap();

        assert_eq!(token, "tok-2");
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0].id, "ps-1");
        assert_eq!(plants[0].name, "Casa");
    }

    #[tokio::test]
    async fn test_collated_snapshot_degrades_failed_slices() {
        let server = MockServer::start().await;
        mount_login(&server, serde_json::json!("plain-token")).await;

        Mock::given(method("POST"))
            .and(path(POWERFLOW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"powerflow": {"pv": "1.5kW", "soc": 77}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(PLANT_DETAIL_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(INVERTER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"sn": "INV-1"}]
            })))
            .mount(&server)
            .await;

        let client = PortalClient::with_base_url(&server.uri());
        let (snapshot, token) = client
            .load_collated("user", "pass", "ps-1")
            .await
            .unwrap();

        assert_eq!(token, "plain-token");
        assert_eq!(snapshot.generation_live, Some(1.5));
        assert_eq!(snapshot.soc, Some(77.0));
        assert!(snapshot.name.is_none()); // detail slice degraded
        assert_eq!(snapshot.inverters.len(), 1);
    }
}
