use crate::domain_model::{
    CatalogId, Component, ComponentKind, Image, Lens, NewComponent, NewImage, NewLens,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("store error: {0}")]
    Store(String),
}

impl CatalogError {
    pub fn image_not_found(id: CatalogId) -> Self {
        CatalogError::NotFound(format!("image {id}"))
    }

    pub fn component_not_found(kind: ComponentKind, id: CatalogId) -> Self {
        CatalogError::NotFound(format!("{kind} {id}"))
    }
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_images(&self) -> Result<Vec<Image>, CatalogError>;
    async fn get_image(&self, id: CatalogId) -> Result<Image, CatalogError>;
    async fn create_image(&self, image: NewImage) -> Result<Image, CatalogError>;

    async fn list_components(&self, kind: ComponentKind) -> Result<Vec<Component>, CatalogError>;
    async fn create_component(
        &self,
        kind: ComponentKind,
        component: NewComponent,
    ) -> Result<Component, CatalogError>;

    async fn list_lenses(&self) -> Result<Vec<Lens>, CatalogError>;
    async fn get_lens(&self, id: CatalogId) -> Result<Lens, CatalogError>;
    async fn create_lens(&self, lens: NewLens) -> Result<Lens, CatalogError>;

    async fn link_image(
        &self,
        kind: ComponentKind,
        id: CatalogId,
        image_id: CatalogId,
    ) -> Result<(), CatalogError>;
    async fn unlink_image(&self, kind: ComponentKind, id: CatalogId) -> Result<(), CatalogError>;
}
