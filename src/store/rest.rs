use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{BudgetRecord, NewRecord};
use crate::settings::RemoteSettings;

/// Budget table served by PostgREST (e.g. a Supabase project).
pub(crate) struct RestStore {
    base_url: Url,
    table: String,
    api_key: String,
    http: Client,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.error_description)
            .or(self.msg)
            .or(self.error)
    }
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct YearRow {
    tahun: i32,
}

impl RestStore {
    pub(crate) fn new(settings: &RemoteSettings) -> anyhow::Result<Self> {
        let base_url = parse_base_url(&settings.url)?;
        if settings.anon_key.trim().is_empty() {
            anyhow::bail!("remote.anon_key is not set");
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            base_url,
            table: settings.table.clone(),
            api_key: settings.anon_key.clone(),
            http,
        })
    }

    /// `{base}/rest/v1/{table}?{pairs}`
    pub(crate) fn table_url(&self, pairs: &[(&str, String)]) -> StoreResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", self.table))
            .map_err(|err| StoreError::Decode(format!("invalid table url: {err}")))?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub(crate) fn token_url(&self) -> StoreResult<Url> {
        let mut url = self
            .base_url
            .join("auth/v1/token")
            .map_err(|err| StoreError::Decode(format!("invalid auth url: {err}")))?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn get_rows<T: DeserializeOwned>(&self, url: Url) -> StoreResult<Vec<T>> {
        tracing::debug!(%url, "GET");
        let res = self.authorized(self.http.get(url)).send()?;
        decode(res)
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("remote.url is not set");
    }
    // Url::join drops the last path segment unless the base ends with '/'.
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|err| anyhow::anyhow!("invalid remote.url '{trimmed}': {err}"))
}

fn decode<T: DeserializeOwned>(res: Response) -> StoreResult<T> {
    let status = res.status();
    if status.is_success() {
        return res
            .json::<T>()
            .map_err(|err| StoreError::Decode(err.to_string()));
    }
    Err(status_error(status.as_u16(), res))
}

fn status_error(status: u16, res: Response) -> StoreError {
    let body = res.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body
            }
        });
    StoreError::Status { status, message }
}

pub(crate) fn order_all() -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("order", "tahun.desc,kategori.asc".to_string()),
    ]
}

pub(crate) fn order_by_category(kategori: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("kategori", format!("eq.{kategori}")),
        ("order", "tahun.desc,subkategori.asc".to_string()),
    ]
}

pub(crate) fn years_only() -> Vec<(&'static str, String)> {
    vec![
        ("select", "tahun".to_string()),
        ("order", "tahun.desc".to_string()),
    ]
}

pub(crate) fn by_id(id: i64) -> Vec<(&'static str, String)> {
    vec![("id", format!("eq.{id}"))]
}

impl RecordStore for RestStore {
    fn select_all(&self) -> StoreResult<Vec<BudgetRecord>> {
        self.get_rows(self.table_url(&order_all())?)
    }

    fn select_by_category(&self, kategori: &str) -> StoreResult<Vec<BudgetRecord>> {
        self.get_rows(self.table_url(&order_by_category(kategori))?)
    }

    fn select_years(&self) -> StoreResult<Vec<i32>> {
        let rows: Vec<YearRow> = self.get_rows(self.table_url(&years_only())?)?;
        Ok(rows.into_iter().map(|r| r.tahun).collect())
    }

    fn insert(&mut self, record: &NewRecord) -> StoreResult<BudgetRecord> {
        let url = self.table_url(&[])?;
        tracing::debug!(%url, tahun = record.tahun, kategori = %record.kategori, "POST");
        let res = self
            .authorized(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()?;
        let mut rows: Vec<BudgetRecord> = decode(res)?;
        if rows.is_empty() {
            return Err(StoreError::Decode("insert returned no row".into()));
        }
        Ok(rows.swap_remove(0))
    }

    fn delete(&mut self, id: i64) -> StoreResult<()> {
        let url = self.table_url(&by_id(id))?;
        tracing::debug!(%url, "DELETE");
        let res = self
            .authorized(self.http.delete(url))
            .header("Prefer", "return=representation")
            .send()?;
        let deleted: Vec<BudgetRecord> = decode(res)?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn sign_in(&self, username: &str, password: &str) -> StoreResult<bool> {
        let url = self.token_url()?;
        let res = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant {
                email: username,
                password,
            })
            .send()?;
        let status = res.status().as_u16();
        match status {
            200..=299 => Ok(true),
            400 | 401 | 403 => {
                tracing::info!(status, "hosted auth rejected credentials");
                Ok(false)
            }
            _ => Err(status_error(status, res)),
        }
    }

    fn describe(&self) -> String {
        format!("{}rest/v1/{}", self.base_url, self.table)
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod rest_tests;
