use crate::k8s::types::{ClaimRecord, NodeRecord, VolumeRecord};
use crate::{ExporterError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, PersistentVolume, PersistentVolumeClaim};
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::{debug, info};

/// Supplier of the cluster inventory the exporter aggregates.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>>;

    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>>;

    async fn list_claims(&self) -> Result<Vec<ClaimRecord>>;
}

/// One cycle's worth of inventory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub nodes: Vec<NodeRecord>,
    pub volumes: Vec<VolumeRecord>,
    pub claims: Vec<ClaimRecord>,
}

impl Inventory {
    /// Fetch nodes, volumes and claims one after another; the first failure aborts the fetch.
    pub async fn fetch<S: InventorySource + ?Sized>(source: &S) -> Result<Self> {
        let nodes = source.list_nodes().await?;
        let volumes = source.list_volumes().await?;
        let claims = source.list_claims().await?;

        Ok(Self {
            nodes,
            volumes,
            claims,
        })
    }
}

pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    pub async fn try_default() -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = Client::try_default().await.map_err(|e| {
            ExporterError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client })
    }

    pub fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    pub fn volumes(&self) -> Api<PersistentVolume> {
        Api::all(self.client.clone())
    }

    pub fn claims_all(&self) -> Api<PersistentVolumeClaim> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl InventorySource for K8sClient {
    async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
        let node_list = self
            .nodes()
            .list(&ListParams::default())
            .await
            .map_err(|e| ExporterError::KubernetesError(format!("Failed to list nodes: {}", e)))?;

        Ok(node_list.items.iter().map(NodeRecord::from_k8s_node).collect())
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>> {
        let pv_list = self
            .volumes()
            .list(&ListParams::default())
            .await
            .map_err(|e| {
                ExporterError::KubernetesError(format!("Failed to list persistent volumes: {}", e))
            })?;

        Ok(pv_list
            .items
            .iter()
            .map(VolumeRecord::from_k8s_volume)
            .collect())
    }

    async fn list_claims(&self) -> Result<Vec<ClaimRecord>> {
        let pvc_list = self
            .claims_all()
            .list(&ListParams::default())
            .await
            .map_err(|e| {
                ExporterError::KubernetesError(format!(
                    "Failed to list persistent volume claims: {}",
                    e
                ))
            })?;

        Ok(pvc_list
            .items
            .iter()
            .map(ClaimRecord::from_k8s_claim)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingVolumes {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InventorySource for FailingVolumes {
        async fn list_nodes(&self) -> Result<Vec<NodeRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn list_volumes(&self) -> Result<Vec<VolumeRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ExporterError::KubernetesError("boom".to_string()))
        }

        async fn list_claims(&self) -> Result<Vec<ClaimRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_fetch_stops_at_first_failure() {
        let source = FailingVolumes {
            calls: AtomicUsize::new(0),
        };

        let result = Inventory::fetch(&source).await;

        assert!(matches!(result, Err(ExporterError::KubernetesError(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
