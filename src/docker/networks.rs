//! Network operations

use bollard::network::ListNetworksOptions;
use tracing::{debug, info};

use crate::core::{DockerError, IpamConfig, NetworkContainer, NetworkInfo, NetworkIpam};
use crate::docker::{DockerClient, DockerResult};

impl DockerClient {
    /// List all networks
    pub async fn list_networks(&self) -> DockerResult<Vec<NetworkInfo>> {
        debug!("Listing networks");

        let options = ListNetworksOptions::<String> {
            filters: Default::default(),
        };

        let networks = self
            .inner()
            .list_networks(Some(options))
            .await
            .map_err(|e| DockerError::Network(format!("Failed to list networks: {}", e)))?;

        info!("Found {} networks", networks.len());

        Ok(networks.into_iter().map(NetworkInfo::from).collect())
    }

    /// Remove a network
    pub async fn remove_network(&self, id: &str) -> DockerResult<()> {
        info!("Removing network: {}", id);

        self.inner()
            .remove_network(id)
            .await
            .map_err(|e| DockerError::Network(format!("Failed to remove {}: {}", id, e)))?;

        info!("Network {} removed successfully", id);
        Ok(())
    }
}

impl From<bollard::models::Network> for NetworkInfo {
    fn from(n: bollard::models::Network) -> Self {
        let ipam = n
            .ipam
            .map(|ipam| NetworkIpam {
                driver: ipam.driver,
                config: ipam
                    .config
                    .unwrap_or_default()
                    .into_iter()
                    .map(|c| IpamConfig {
                        subnet: c.subnet,
                        gateway: c.gateway,
                        ip_range: c.ip_range,
                    })
                    .collect(),
                options: ipam.options.unwrap_or_default(),
            })
            .unwrap_or_default();

        let containers = n
            .containers
            .unwrap_or_default()
            .into_iter()
            .map(|(id, c)| {
                (
                    id,
                    NetworkContainer {
                        name: c.name,
                        endpoint_id: c.endpoint_id,
                        mac_address: c.mac_address,
                        ipv4_address: c.ipv4_address,
                        ipv6_address: c.ipv6_address,
                    },
                )
            })
            .collect();

        Self {
            id: n.id.unwrap_or_default(),
            name: n.name.unwrap_or_default(),
            driver: n.driver.unwrap_or_else(|| "bridge".to_string()),
            scope: n.scope.unwrap_or_else(|| "local".to_string()),
            created: n.created,
            internal: n.internal.unwrap_or(false),
            attachable: n.attachable.unwrap_or(false),
            ingress: n.ingress.unwrap_or(false),
            ipam,
            containers,
            options: n.options.unwrap_or_default(),
            labels: n.labels.unwrap_or_default(),
        }
    }
}
