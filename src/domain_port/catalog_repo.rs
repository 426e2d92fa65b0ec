use crate::application_port::CatalogError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait CatalogRepo: Send + Sync {
    async fn list_images(&self) -> Result<Vec<Image>, CatalogError>;
    async fn get_image(&self, id: CatalogId) -> Result<Option<Image>, CatalogError>;
    async fn insert_image(
        &self,
        image: NewImage,
        upload_date: DateTime<Utc>,
    ) -> Result<Image, CatalogError>;

    async fn list_components(&self, kind: ComponentKind) -> Result<Vec<Component>, CatalogError>;
    async fn get_component(
        &self,
        kind: ComponentKind,
        id: CatalogId,
    ) -> Result<Option<Component>, CatalogError>;
    /// Fails with `Conflict` when the code is already taken for that kind.
    async fn insert_component(
        &self,
        kind: ComponentKind,
        component: NewComponent,
    ) -> Result<Component, CatalogError>;
    /// Returns `false` when no such component exists.
    async fn set_component_image(
        &self,
        kind: ComponentKind,
        id: CatalogId,
        image_id: Option<CatalogId>,
    ) -> Result<bool, CatalogError>;

    async fn list_lenses(&self) -> Result<Vec<Lens>, CatalogError>;
    async fn get_lens(&self, id: CatalogId) -> Result<Option<Lens>, CatalogError>;
    /// Fails with `Conflict` when the EDI code is already taken.
    async fn insert_lens(&self, lens: NewLens) -> Result<Lens, CatalogError>;
}
