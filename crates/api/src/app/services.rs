use std::sync::Arc;

use keygate_auth::{CredentialResolver, IdentityStore, InMemoryIdentityStore, Provisioner};
use keygate_infra::{
    AppConfig, BootstrapError, BootstrapReport, InMemoryProductStore, ProductStore, bootstrap,
};

/// Shared handles passed to every handler as an axum `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub identity: Arc<dyn IdentityStore>,
    pub products: Arc<dyn ProductStore>,
}

impl AppServices {
    pub fn new(identity: Arc<dyn IdentityStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { identity, products }
    }

    pub fn resolver(&self) -> CredentialResolver<Arc<dyn IdentityStore>> {
        CredentialResolver::new(self.identity.clone())
    }

    pub fn provisioner(&self) -> Provisioner<Arc<dyn IdentityStore>> {
        Provisioner::new(self.identity.clone())
    }
}

/// In-memory stores, seeded according to `config`.
pub fn build_services(config: &AppConfig) -> Result<(AppServices, BootstrapReport), BootstrapError> {
    let identity: Arc<dyn IdentityStore> = Arc::new(InMemoryIdentityStore::new());
    let products: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());

    let report = bootstrap(identity.clone(), products.clone(), config)?;
    Ok((AppServices::new(identity, products), report))
}
