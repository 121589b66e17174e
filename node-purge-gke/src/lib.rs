//! Cloud collaborator for Google Kubernetes Engine.
//!
//! Node pool metadata comes from the Container API, instance termination goes
//! through the Compute API. Both are plain REST calls authorised with an OAuth
//! bearer token taken either from the GCE metadata server or, for local runs,
//! from the environment.

use std::fmt;
use std::time::Duration;

use constcat::concat;
use node_purge::BoxError;
use node_purge::CloudPoolProvider;
use node_purge::Node;
use node_purge::NodePool;
use serde::de::DeserializeOwned;

pub use error::GkeError;
pub use error::GkeResult;

use wire::AccessToken;
use wire::ListClustersResponse;
use wire::NodePoolResource;
use wire::Operation;

mod error;
pub mod wire;

pub const CONTAINER_ENDPOINT: &str = "https://container.googleapis.com/v1";
pub const COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

const METADATA_SERVER: &str = "http://metadata.google.internal";
const METADATA_TOKEN_URL: &str =
    concat!(METADATA_SERVER, "/computeMetadata/v1/instance/service-accounts/default/token");

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum Credentials {
    /// The default service account of the GCE metadata server.
    MetadataServer,
    /// A fixed token, e.g. `gcloud auth print-access-token`.
    Static(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetadataServer => f.write_str("MetadataServer"),
            Self::Static(_) => f.write_str("Static(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GkeApi {
    project: String,
    credentials: Credentials,
    container_endpoint: String,
    compute_endpoint: String,
    http: reqwest::Client,
}

impl GkeApi {
    /// Every request, token fetches included, gives up after `timeout`.
    pub fn new(
        project: impl ToString,
        credentials: Credentials,
        timeout: Duration,
    ) -> GkeResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            project: project.to_string(),
            credentials,
            container_endpoint: CONTAINER_ENDPOINT.to_string(),
            compute_endpoint: COMPUTE_ENDPOINT.to_string(),
            http,
        })
    }

    /// Point the client at alternative API roots.
    pub fn with_endpoints(self, container: impl ToString, compute: impl ToString) -> Self {
        Self {
            container_endpoint: container.to_string(),
            compute_endpoint: compute.to_string(),
            ..self
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Location (region or zone) of the named cluster.
    pub async fn cluster_location(&self, cluster: &str) -> GkeResult<String> {
        let url = clusters_url(&self.container_endpoint, &self.project);
        let response: ListClustersResponse = self.get(&url).await?;
        response
            .clusters
            .into_iter()
            .find(|candidate| candidate.name == cluster)
            .map(|found| found.location)
            .ok_or_else(|| GkeError::ClusterNotFound(cluster.to_string()))
    }

    pub async fn get_node_pool(&self, cluster: &str, pool: &str) -> GkeResult<NodePoolResource> {
        let location = self.cluster_location(cluster).await?;
        let url = node_pool_url(
            &self.container_endpoint,
            &self.project,
            &location,
            cluster,
            pool,
        );
        self.get(&url).await
    }

    /// Request deletion of a Compute Engine instance. The returned operation
    /// is not awaited.
    pub async fn delete_compute_instance(&self, zone: &str, name: &str) -> GkeResult<Operation> {
        let url = instance_url(&self.compute_endpoint, &self.project, zone, name);
        let token = self.token().await?;
        let response = self.http.delete(&url).bearer_auth(token).send().await?;
        let response = check("DELETE", &url, response).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> GkeResult<T> {
        let token = self.token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let response = check("GET", url, response).await?;
        Ok(response.json().await?)
    }

    async fn token(&self) -> GkeResult<String> {
        match &self.credentials {
            Credentials::Static(token) => Ok(token.clone()),
            Credentials::MetadataServer => {
                let response = self
                    .http
                    .get(METADATA_TOKEN_URL)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|err| GkeError::Token(err.to_string()))?;
                let response = check("GET", METADATA_TOKEN_URL, response).await?;
                let token: AccessToken = response
                    .json()
                    .await
                    .map_err(|err| GkeError::Token(err.to_string()))?;
                Ok(token.access_token)
            }
        }
    }
}

async fn check(
    method: &'static str,
    url: &str,
    response: reqwest::Response,
) -> GkeResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GkeError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn clusters_url(endpoint: &str, project: &str) -> String {
    format!("{endpoint}/projects/{project}/locations/-/clusters")
}

fn node_pool_url(endpoint: &str, project: &str, location: &str, cluster: &str, pool: &str) -> String {
    format!("{endpoint}/projects/{project}/locations/{location}/clusters/{cluster}/nodePools/{pool}")
}

fn instance_url(endpoint: &str, project: &str, zone: &str, name: &str) -> String {
    format!("{endpoint}/projects/{project}/zones/{zone}/instances/{name}")
}

impl CloudPoolProvider for GkeApi {
    async fn fetch_node_pool(
        &self,
        cluster: &str,
        pool: &str,
        inventory: &[Node],
    ) -> Result<NodePool, BoxError> {
        let resource = self.get_node_pool(cluster, pool).await?;
        tracing::debug!(
            pool,
            status = %resource.status,
            min_node_count = resource.autoscaling.min_node_count,
            zones = resource.instance_group_urls.len(),
            "Fetched node pool"
        );
        Ok(resource.into_node_pool(pool, inventory))
    }

    async fn delete_instance(&self, cluster: &str, node: &Node) -> Result<(), BoxError> {
        let operation = self.delete_compute_instance(&node.zone, &node.name).await?;
        tracing::info!(
            cluster,
            node = %node.name,
            zone = %node.zone,
            operation = %operation.name,
            "Requested instance deletion"
        );
        Ok(())
    }
}
