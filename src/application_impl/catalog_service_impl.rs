use crate::application_port::{CatalogError, CatalogService};
use crate::domain_model::*;
use crate::domain_port::CatalogRepo;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct RealCatalogService {
    catalog_repo: Arc<dyn CatalogRepo>,
}

impl RealCatalogService {
    pub fn new(catalog_repo: Arc<dyn CatalogRepo>) -> Self {
        Self { catalog_repo }
    }

    async fn ensure_image(&self, id: CatalogId) -> Result<(), CatalogError> {
        match self.catalog_repo.get_image(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::image_not_found(id)),
        }
    }

    async fn ensure_component(&self, kind: ComponentKind, id: CatalogId) -> Result<(), CatalogError> {
        match self.catalog_repo.get_component(kind, id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::component_not_found(kind, id)),
        }
    }
}

#[async_trait::async_trait]
impl CatalogService for RealCatalogService {
    async fn list_images(&self) -> Result<Vec<Image>, CatalogError> {
        self.catalog_repo.list_images().await
    }

    async fn get_image(&self, id: CatalogId) -> Result<Image, CatalogError> {
        self.catalog_repo
            .get_image(id)
            .await?
            .ok_or_else(|| CatalogError::image_not_found(id))
    }

    async fn create_image(&self, image: NewImage) -> Result<Image, CatalogError> {
        self.catalog_repo.insert_image(image, Utc::now()).await
    }

    async fn list_components(&self, kind: ComponentKind) -> Result<Vec<Component>, CatalogError> {
        self.catalog_repo.list_components(kind).await
    }

    async fn create_component(
        &self,
        kind: ComponentKind,
        component: NewComponent,
    ) -> Result<Component, CatalogError> {
        if let Some(image_id) = component.image_id {
            self.ensure_image(image_id).await?;
        }
        self.catalog_repo.insert_component(kind, component).await
    }

    async fn list_lenses(&self) -> Result<Vec<Lens>, CatalogError> {
        self.catalog_repo.list_lenses().await
    }

    async fn get_lens(&self, id: CatalogId) -> Result<Lens, CatalogError> {
        self.catalog_repo
            .get_lens(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("lens {id}")))
    }

    async fn create_lens(&self, lens: NewLens) -> Result<Lens, CatalogError> {
        for (kind, id) in lens.component_refs() {
            if let Some(id) = id {
                self.ensure_component(kind, id).await?;
            }
        }
        self.catalog_repo.insert_lens(lens).await
    }

    async fn link_image(
        &self,
        kind: ComponentKind,
        id: CatalogId,
        image_id: CatalogId,
    ) -> Result<(), CatalogError> {
        self.ensure_image(image_id).await?;
        if !self
            .catalog_repo
            .set_component_image(kind, id, Some(image_id))
            .await?
        {
            return Err(CatalogError::component_not_found(kind, id));
        }
        info!(%kind, %id, %image_id, "image linked");
        Ok(())
    }

    async fn unlink_image(&self, kind: ComponentKind, id: CatalogId) -> Result<(), CatalogError> {
        if !self.catalog_repo.set_component_image(kind, id, None).await? {
            return Err(CatalogError::component_not_found(kind, id));
        }
        info!(%kind, %id, "image unlinked");
        Ok(())
    }
}
