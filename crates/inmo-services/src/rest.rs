//! Reqwest-backed resource services against the back-office REST API.
//!
//! Wire types are the domain models themselves; the API speaks the same
//! Spanish field names. Default lookups see active records only; the
//! `incluir_inactivos` query flag widens them.

use async_trait::async_trait;
use inmo_core::config::ServicesConfig;
use inmo_core::error::InmoError;
use inmo_core::model::{
    Client, ClientChanges, NewClient, NewProperty, NewStaffUser, Property, PropertyChanges,
    ResourceStatus, StaffUser,
};
use inmo_core::traits::{ClientService, PropertyService, StaffService};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP plumbing for the three resource services.
pub struct RestApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestApi {
    fn new(config: &ServicesConfig) -> Result<Self, InmoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InmoError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        call: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, InmoError> {
        debug!("back-office call: {call}");
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InmoError::upstream(call, "tiempo de espera agotado")
            } else {
                InmoError::upstream(call, e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| InmoError::upstream(call, e));
        }

        let detail = response.text().await.unwrap_or_default();
        Err(map_status(call, status, &detail))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        call: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, InmoError> {
        self.execute(call, self.request(reqwest::Method::GET, path).query(query))
            .await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        call: &str,
        path: &str,
        body: &B,
    ) -> Result<T, InmoError> {
        self.execute(call, self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        call: &str,
        path: &str,
        body: &B,
    ) -> Result<T, InmoError> {
        self.execute(call, self.request(reqwest::Method::PATCH, path).json(body))
            .await
    }
}

/// Fold a non-success HTTP status into the error taxonomy.
fn map_status(call: &str, status: StatusCode, detail: &str) -> InmoError {
    let detail = if detail.is_empty() {
        status.to_string()
    } else {
        detail.to_string()
    };
    match status {
        StatusCode::NOT_FOUND => InmoError::NotFound(call.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            InmoError::Validation(detail)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InmoError::Authorization(detail),
        StatusCode::CONFLICT => InmoError::Conflict(detail),
        _ => InmoError::upstream(call, detail),
    }
}

/// Handle to the three resource services, sharing one HTTP client.
pub struct BackOffice {
    api: Arc<RestApi>,
}

impl BackOffice {
    pub fn new(config: &ServicesConfig) -> Result<Self, InmoError> {
        Ok(Self {
            api: Arc::new(RestApi::new(config)?),
        })
    }

    pub fn clients(&self) -> Arc<dyn ClientService> {
        Arc::new(RestClients {
            api: self.api.clone(),
        })
    }

    pub fn properties(&self) -> Arc<dyn PropertyService> {
        Arc::new(RestProperties {
            api: self.api.clone(),
        })
    }

    pub fn staff(&self) -> Arc<dyn StaffService> {
        Arc::new(RestStaff {
            api: self.api.clone(),
        })
    }
}

struct RestClients {
    api: Arc<RestApi>,
}

#[async_trait]
impl ClientService for RestClients {
    async fn get(&self, id: &str) -> Result<Client, InmoError> {
        self.api
            .get(&format!("cliente {id}"), &format!("/clientes/{id}"), &[])
            .await
    }

    async fn get_any_status(&self, id: &str) -> Result<Client, InmoError> {
        self.api
            .get(
                &format!("cliente {id}"),
                &format!("/clientes/{id}"),
                &[("incluir_inactivos", "true")],
            )
            .await
    }

    async fn list(&self) -> Result<Vec<Client>, InmoError> {
        self.api.get("listar clientes", "/clientes", &[]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Client>, InmoError> {
        self.api
            .get("buscar clientes", "/clientes", &[("buscar", query)])
            .await
    }

    async fn create(&self, data: NewClient) -> Result<Client, InmoError> {
        self.api.post("crear cliente", "/clientes", &data).await
    }

    async fn update(&self, id: &str, changes: ClientChanges) -> Result<Client, InmoError> {
        self.api
            .patch(&format!("cliente {id}"), &format!("/clientes/{id}"), &changes)
            .await
    }

    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<Client, InmoError> {
        self.api
            .patch(
                &format!("cliente {id}"),
                &format!("/clientes/{id}/estado"),
                &json!({ "status": status }),
            )
            .await
    }
}

struct RestProperties {
    api: Arc<RestApi>,
}

#[async_trait]
impl PropertyService for RestProperties {
    async fn get(&self, id: &str) -> Result<Property, InmoError> {
        self.api
            .get(&format!("propiedad {id}"), &format!("/propiedades/{id}"), &[])
            .await
    }

    async fn get_any_status(&self, id: &str) -> Result<Property, InmoError> {
        self.api
            .get(
                &format!("propiedad {id}"),
                &format!("/propiedades/{id}"),
                &[("incluir_inactivos", "true")],
            )
            .await
    }

    async fn list(&self) -> Result<Vec<Property>, InmoError> {
        self.api.get("listar propiedades", "/propiedades", &[]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Property>, InmoError> {
        self.api
            .get("buscar propiedades", "/propiedades", &[("buscar", query)])
            .await
    }

    async fn create(&self, data: NewProperty) -> Result<Property, InmoError> {
        self.api.post("crear propiedad", "/propiedades", &data).await
    }

    async fn update(&self, id: &str, changes: PropertyChanges) -> Result<Property, InmoError> {
        self.api
            .patch(
                &format!("propiedad {id}"),
                &format!("/propiedades/{id}"),
                &changes,
            )
            .await
    }

    async fn add_files(&self, id: &str, files: &[String]) -> Result<Property, InmoError> {
        self.api
            .post(
                &format!("propiedad {id}"),
                &format!("/propiedades/{id}/archivos"),
                &json!({ "archivos": files }),
            )
            .await
    }

    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<Property, InmoError> {
        self.api
            .patch(
                &format!("propiedad {id}"),
                &format!("/propiedades/{id}/estado"),
                &json!({ "status": status }),
            )
            .await
    }
}

struct RestStaff {
    api: Arc<RestApi>,
}

#[async_trait]
impl StaffService for RestStaff {
    async fn get(&self, id: &str) -> Result<StaffUser, InmoError> {
        self.api
            .get(&format!("usuario {id}"), &format!("/usuarios/{id}"), &[])
            .await
    }

    async fn get_any_status(&self, id: &str) -> Result<StaffUser, InmoError> {
        self.api
            .get(
                &format!("usuario {id}"),
                &format!("/usuarios/{id}"),
                &[("incluir_inactivos", "true")],
            )
            .await
    }

    async fn find_by_phone(&self, telefono: &str) -> Result<Option<StaffUser>, InmoError> {
        let matches: Vec<StaffUser> = self
            .api
            .get("buscar usuario", "/usuarios", &[("telefono", telefono)])
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<StaffUser>, InmoError> {
        self.api.get("listar usuarios", "/usuarios", &[]).await
    }

    async fn create(&self, data: NewStaffUser) -> Result<StaffUser, InmoError> {
        self.api.post("crear usuario", "/usuarios", &data).await
    }

    async fn set_status(&self, id: &str, status: ResourceStatus) -> Result<StaffUser, InmoError> {
        self.api
            .patch(
                &format!("usuario {id}"),
                &format!("/usuarios/{id}/estado"),
                &json!({ "status": status }),
            )
            .await
    }
}
