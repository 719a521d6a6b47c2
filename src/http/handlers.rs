//! Director API handlers.
//!
//! # Responsibilities
//! - Accept origin and cache advertisements
//! - Answer namespace queries with the matching servers
//! - Redirect object requests to a cache or origin
//!
//! # Design Decisions
//! - Redirects go to the first server in advertisement order; every
//!   alternative is listed in the `Link` header with ascending priority
//! - Servers that require a token for the namespace are addressed through
//!   their auth URL

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::error::ApiError;
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::registry::{NamespaceAd, Resolution, ServerAd, ServerType};

pub const X_DIRECTOR_NAMESPACE: HeaderName =
    HeaderName::from_static("x-director-namespace");
pub const X_DIRECTOR_AUTHORIZATION: HeaderName =
    HeaderName::from_static("x-director-authorization");

/// Body of `registerOrigin` / `registerCache`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<Url>,
    #[serde(default)]
    pub namespaces: Vec<NamespaceAd>,
}

impl RegistrationRequest {
    fn into_ad(self, server_type: ServerType) -> (ServerAd, Vec<NamespaceAd>) {
        let mut server = ServerAd::new(self.name, server_type, self.url);
        server.auth_url = self.auth_url;
        (server, self.namespaces)
    }
}

/// Body of `advertise`, where the server type travels in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertisementRequest {
    #[serde(rename = "type")]
    pub server_type: String,
    #[serde(flatten)]
    pub registration: RegistrationRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub status: String,
    pub namespaces: usize,
}

pub async fn register_origin(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let Json(request) = payload?;
    record(&state, &headers, request, ServerType::Origin)
}

pub async fn register_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let Json(request) = payload?;
    record(&state, &headers, request, ServerType::Cache)
}

pub async fn advertise(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AdvertisementRequest>, JsonRejection>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let Json(request) = payload?;
    let server_type: ServerType = request.server_type.parse().map_err(|e| {
        tracing::warn!(
            request_id = %headers.request_id(),
            server = %request.registration.name,
            error = %e,
            "Advertisement rejected"
        );
        ApiError::from(e)
    })?;
    record(&state, &headers, request.registration, server_type)
}

fn record(
    state: &AppState,
    headers: &HeaderMap,
    request: RegistrationRequest,
    server_type: ServerType,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let (server, namespaces) = request.into_ad(server_type);
    let recorded = state.recorder.record_ad(&server, &namespaces)?;

    tracing::info!(
        request_id = %headers.request_id(),
        server = %server.name,
        server_type = %server_type,
        namespaces = recorded,
        "Advertisement accepted"
    );

    Ok(Json(RegistrationResponse {
        status: "ok".to_string(),
        namespaces: recorded,
    }))
}

pub async fn get_namespace(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<Resolution>, ApiError> {
    let object_path = absolute(&path);
    let resolution = state.resolver.get_ads_for_path(&object_path);
    if !resolution.is_found() {
        return Err(ApiError::NotFound(format!("no namespace serves {object_path}")));
    }
    Ok(Json(resolution))
}

pub async fn redirect_to_cache(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    redirect(&state, &headers, &path, ServerType::Cache)
}

pub async fn redirect_to_origin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    redirect(&state, &headers, &path, ServerType::Origin)
}

pub async fn health() -> &'static str {
    "ok"
}

fn redirect(
    state: &AppState,
    headers: &HeaderMap,
    path: &str,
    server_type: ServerType,
) -> Result<Response, ApiError> {
    let object_path = absolute(path);
    let resolution = state.resolver.get_ads_for_path(&object_path);
    if !resolution.is_found() {
        return Err(ApiError::NotFound(format!("no namespace serves {object_path}")));
    }

    let namespace = &resolution.namespace;
    let servers = resolution.servers(server_type);
    let Some(first) = servers.first() else {
        return Err(ApiError::NotFound(format!(
            "no {server_type} advertises namespace {}",
            namespace.path
        )));
    };

    let location = object_url(first, namespace, &object_path)?;
    let link = servers
        .iter()
        .enumerate()
        .map(|(i, server)| {
            let url = object_url(server, namespace, &object_path)?;
            Ok(format!("<{url}>; rel=\"duplicate\"; pri={}", i + 1))
        })
        .collect::<Result<Vec<_>, ApiError>>()?
        .join(", ");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::LOCATION, header_value(location.as_str())?);
    response_headers.insert(header::LINK, header_value(&link)?);
    response_headers.insert(
        X_DIRECTOR_NAMESPACE,
        header_value(&format!(
            "namespace={}, require-token={}",
            namespace.path, namespace.require_token
        ))?,
    );
    if namespace.require_token {
        if let Some(issuer) = &namespace.issuer {
            response_headers.insert(
                X_DIRECTOR_AUTHORIZATION,
                header_value(&format!(
                    "issuer={}",
                    issuer.as_str().trim_end_matches('/')
                ))?,
            );
        }
    }

    tracing::debug!(
        request_id = %headers.request_id(),
        path = %object_path,
        namespace = %namespace.path,
        server = %first.name,
        location = %location,
        "Redirecting"
    );

    Ok((StatusCode::TEMPORARY_REDIRECT, response_headers).into_response())
}

/// Wildcard captures arrive without the leading slash.
fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Append the decoded object path to the server endpoint, re-encoding each
/// segment so `?`, `#` and non-ASCII bytes stay part of the path.
fn object_url(
    server: &ServerAd,
    namespace: &NamespaceAd,
    object_path: &str,
) -> Result<Url, ApiError> {
    let mut url = server.endpoint_for(namespace).clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ApiError::Internal(format!("server {} has no base URL", server.name)))?
        .pop_if_empty()
        .extend(object_path.split('/').skip(1));
    Ok(url)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|_| ApiError::BadRequest(format!("{value:?} cannot be sent in a header")))
}
