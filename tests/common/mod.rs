//! Common test utilities and helpers
//!
//! [`StubRegistry`] is a scriptable provider: every operation can be
//! overridden with a hook and otherwise returns a benign value built from
//! its arguments. [`TestApp`] serves the full API over TCP on top of a
//! [`LocalRegistry`] in a temporary directory.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use hub_api::{build_api_server, build_router, AppState};
use hub_core::*;
use hub_registry::LocalRegistry;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub mod fixtures;

/// Override for one provider operation
pub type Hook<A, T> = Arc<dyn Fn(A) -> RegistryResult<T> + Send + Sync>;

/// Wrap a closure as a hook
pub fn hook<A, T>(f: impl Fn(A) -> RegistryResult<T> + Send + Sync + 'static) -> Option<Hook<A, T>> {
    Some(Arc::new(f))
}

/// Provider double with per-operation hooks
#[derive(Default, Clone)]
pub struct StubRegistry {
    pub calls: Arc<Mutex<Vec<&'static str>>>,

    pub list_namespaces: Option<Hook<(), NamespaceList>>,
    pub create_namespace: Option<Hook<NamespaceInfo, Namespace>>,
    pub read_namespace: Option<Hook<String, Namespace>>,
    pub update_namespace: Option<Hook<(String, NamespaceInfo), Namespace>>,
    pub delete_namespace: Option<Hook<String, ()>>,

    pub list_resources: Option<Hook<String, ResourceList>>,
    pub create_resource: Option<Hook<(String, ResourceInfo), Resource>>,
    pub read_resource: Option<Hook<(String, String), Resource>>,
    pub update_resource: Option<Hook<(String, String, ResourceInfo), Resource>>,
    pub delete_resource: Option<Hook<(String, String), ()>>,

    pub list_versions: Option<Hook<(String, String), VersionList>>,
    pub create_version: Option<Hook<(String, String, VersionInfo), Version>>,
    pub read_version: Option<Hook<(String, String, String), Version>>,
    pub update_version: Option<Hook<(String, String, String, VersionInfo), Version>>,
    pub delete_version: Option<Hook<(String, String, String), ()>>,
    pub upload_archive: Option<Hook<(String, String, String, Option<String>, Vec<u8>), Version>>,
    pub download_archive: Option<Hook<(String, String, String), ArchiveStream>>,

    pub list_channels: Option<Hook<(String, String), ChannelList>>,
    pub create_channel: Option<Hook<(String, String, ChannelInfo), Channel>>,
    pub read_channel: Option<Hook<(String, String, String), Channel>>,
    pub update_channel: Option<Hook<(String, String, String, ChannelInfo), Channel>>,
    pub delete_channel: Option<Hook<(String, String, String), ()>>,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations invoked so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }

    /// Router over this stub, sharing its call log
    pub fn router(&self) -> Router {
        build_router(AppState::new(Arc::new(self.clone())))
    }
}

/// Default archive returned by the stub
pub const STUB_ARCHIVE: &[u8] = b"mock archive data";

fn version(namespace: &str, resource: &str, string: &str) -> Version {
    Version {
        namespace: namespace.to_string(),
        resource: resource.to_string(),
        string: string.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl Registry for StubRegistry {
    async fn list_namespaces(&self) -> RegistryResult<NamespaceList> {
        self.record("list_namespaces");
        match &self.list_namespaces {
            Some(f) => f(()),
            None => Ok(NamespaceList::default()),
        }
    }

    async fn create_namespace(&self, info: NamespaceInfo) -> RegistryResult<Namespace> {
        self.record("create_namespace");
        match &self.create_namespace {
            Some(f) => f(info),
            None => Ok(Namespace {
                name: info.name,
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn read_namespace(&self, namespace: &str) -> RegistryResult<Namespace> {
        self.record("read_namespace");
        match &self.read_namespace {
            Some(f) => f(namespace.to_string()),
            None => Ok(Namespace {
                name: namespace.to_string(),
                ..Default::default()
            }),
        }
    }

    async fn update_namespace(
        &self,
        namespace: &str,
        info: NamespaceInfo,
    ) -> RegistryResult<Namespace> {
        self.record("update_namespace");
        match &self.update_namespace {
            Some(f) => f((namespace.to_string(), info)),
            None => Ok(Namespace {
                name: namespace.to_string(),
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn delete_namespace(&self, namespace: &str) -> RegistryResult<()> {
        self.record("delete_namespace");
        match &self.delete_namespace {
            Some(f) => f(namespace.to_string()),
            None => Ok(()),
        }
    }

    async fn list_resources(&self, namespace: &str) -> RegistryResult<ResourceList> {
        self.record("list_resources");
        match &self.list_resources {
            Some(f) => f(namespace.to_string()),
            None => Ok(ResourceList::default()),
        }
    }

    async fn create_resource(
        &self,
        namespace: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource> {
        self.record("create_resource");
        match &self.create_resource {
            Some(f) => f((namespace.to_string(), info)),
            None => Ok(Resource {
                namespace: namespace.to_string(),
                name: info.name,
                kind: info.kind,
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn read_resource(&self, namespace: &str, resource: &str) -> RegistryResult<Resource> {
        self.record("read_resource");
        match &self.read_resource {
            Some(f) => f((namespace.to_string(), resource.to_string())),
            None => Ok(Resource {
                namespace: namespace.to_string(),
                name: resource.to_string(),
                ..Default::default()
            }),
        }
    }

    async fn update_resource(
        &self,
        namespace: &str,
        resource: &str,
        info: ResourceInfo,
    ) -> RegistryResult<Resource> {
        self.record("update_resource");
        match &self.update_resource {
            Some(f) => f((namespace.to_string(), resource.to_string(), info)),
            None => Ok(Resource {
                namespace: namespace.to_string(),
                name: resource.to_string(),
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn delete_resource(&self, namespace: &str, resource: &str) -> RegistryResult<()> {
        self.record("delete_resource");
        match &self.delete_resource {
            Some(f) => f((namespace.to_string(), resource.to_string())),
            None => Ok(()),
        }
    }

    async fn list_versions(&self, namespace: &str, resource: &str) -> RegistryResult<VersionList> {
        self.record("list_versions");
        match &self.list_versions {
            Some(f) => f((namespace.to_string(), resource.to_string())),
            None => Ok(VersionList::default()),
        }
    }

    async fn create_version(
        &self,
        namespace: &str,
        resource: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version> {
        self.record("create_version");
        match &self.create_version {
            Some(f) => f((namespace.to_string(), resource.to_string(), info)),
            None => Ok(version(namespace, resource, &info.string)),
        }
    }

    async fn read_version(
        &self,
        namespace: &str,
        resource: &str,
        string: &str,
    ) -> RegistryResult<Version> {
        self.record("read_version");
        match &self.read_version {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                string.to_string(),
            )),
            None => Ok(version(namespace, resource, string)),
        }
    }

    async fn update_version(
        &self,
        namespace: &str,
        resource: &str,
        string: &str,
        info: VersionInfo,
    ) -> RegistryResult<Version> {
        self.record("update_version");
        match &self.update_version {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                string.to_string(),
                info,
            )),
            None => Ok(version(namespace, resource, string)),
        }
    }

    async fn delete_version(
        &self,
        namespace: &str,
        resource: &str,
        string: &str,
    ) -> RegistryResult<()> {
        self.record("delete_version");
        match &self.delete_version {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                string.to_string(),
            )),
            None => Ok(()),
        }
    }

    async fn upload_archive(
        &self,
        namespace: &str,
        resource: &str,
        string: &str,
        digest: Option<String>,
        mut archive: ArchiveStream,
    ) -> RegistryResult<Version> {
        self.record("upload_archive");
        let mut data = Vec::new();
        while let Some(chunk) = archive.next().await {
            data.extend_from_slice(&chunk?);
        }

        match &self.upload_archive {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                string.to_string(),
                digest,
                data,
            )),
            None => Ok(Version {
                archive: Some(ArchiveRef {
                    digest: digest.unwrap_or_default(),
                    size: data.len() as u64,
                }),
                ..version(namespace, resource, string)
            }),
        }
    }

    async fn download_archive(
        &self,
        namespace: &str,
        resource: &str,
        string: &str,
    ) -> RegistryResult<ArchiveStream> {
        self.record("download_archive");
        match &self.download_archive {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                string.to_string(),
            )),
            None => Ok(archive_from_bytes(STUB_ARCHIVE)),
        }
    }

    async fn list_channels(&self, namespace: &str, resource: &str) -> RegistryResult<ChannelList> {
        self.record("list_channels");
        match &self.list_channels {
            Some(f) => f((namespace.to_string(), resource.to_string())),
            None => Ok(ChannelList::default()),
        }
    }

    async fn create_channel(
        &self,
        namespace: &str,
        resource: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel> {
        self.record("create_channel");
        match &self.create_channel {
            Some(f) => f((namespace.to_string(), resource.to_string(), info)),
            None => Ok(Channel {
                namespace: namespace.to_string(),
                resource: resource.to_string(),
                version: version(namespace, resource, &info.version),
                name: info.name,
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn read_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<Channel> {
        self.record("read_channel");
        match &self.read_channel {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                channel.to_string(),
            )),
            None => Ok(Channel {
                namespace: namespace.to_string(),
                resource: resource.to_string(),
                name: channel.to_string(),
                ..Default::default()
            }),
        }
    }

    async fn update_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
        info: ChannelInfo,
    ) -> RegistryResult<Channel> {
        self.record("update_channel");
        match &self.update_channel {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                channel.to_string(),
                info,
            )),
            None => Ok(Channel {
                namespace: namespace.to_string(),
                resource: resource.to_string(),
                name: channel.to_string(),
                version: version(namespace, resource, &info.version),
                description: info.description,
                ..Default::default()
            }),
        }
    }

    async fn delete_channel(
        &self,
        namespace: &str,
        resource: &str,
        channel: &str,
    ) -> RegistryResult<()> {
        self.record("delete_channel");
        match &self.delete_channel {
            Some(f) => f((
                namespace.to_string(),
                resource.to_string(),
                channel.to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// A buffered response from [`send`]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {}", name))
            .to_str()
            .expect("header is not ASCII")
    }
}

/// Drive one request through `app` in-process
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Test application served over TCP
pub struct TestApp {
    pub address: String,
    pub registry: Arc<LocalRegistry>,
    _root: tempfile::TempDir,
}

impl TestApp {
    /// Start a server over an empty registry
    pub async fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create archive root");
        let registry = Arc::new(
            LocalRegistry::open(root.path())
                .await
                .expect("Failed to open registry"),
        );

        let app = build_api_server(registry.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to start test server");
        });

        Self {
            address: format!("http://{}", address),
            registry,
            _root: root,
        }
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Create HTTP client
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build client")
    }
}

/// Assert response status
pub fn assert_status(response: &reqwest::Response, expected: reqwest::StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}
