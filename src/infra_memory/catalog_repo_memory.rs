use crate::application_port::CatalogError;
use crate::domain_model::*;
use crate::domain_port::CatalogRepo;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

struct Table<T> {
    rows: DashMap<CatalogId, T>,
    unique_codes: DashMap<String, CatalogId>,
    seq: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            unique_codes: DashMap::new(),
            seq: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> CatalogId {
        CatalogId(self.seq.fetch_add(1, Ordering::Relaxed))
    }

    fn list(&self) -> Vec<T> {
        let mut rows: Vec<(CatalogId, T)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    fn get(&self, id: CatalogId) -> Option<T> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    /// Reserve `code` for `id`. False when another row already owns it.
    fn claim_code(&self, code: &str, id: CatalogId) -> bool {
        let owner = *self.unique_codes.entry(code.to_owned()).or_insert(id);
        owner == id
    }
}

pub struct MemoryCatalogRepo {
    images: Table<Image>,
    designs: Table<Component>,
    treatments: Table<Component>,
    materials: Table<Component>,
    lenses: Table<Lens>,
}

impl MemoryCatalogRepo {
    pub fn new() -> Self {
        Self {
            images: Table::new(),
            designs: Table::new(),
            treatments: Table::new(),
            materials: Table::new(),
            lenses: Table::new(),
        }
    }

    fn components(&self, kind: ComponentKind) -> &Table<Component> {
        match kind {
            ComponentKind::Design => &self.designs,
            ComponentKind::Treatment => &self.treatments,
            ComponentKind::Material => &self.materials,
        }
    }
}

impl Default for MemoryCatalogRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogRepo for MemoryCatalogRepo {
    async fn list_images(&self) -> Result<Vec<Image>, CatalogError> {
        Ok(self.images.list())
    }

    async fn get_image(&self, id: CatalogId) -> Result<Option<Image>, CatalogError> {
        Ok(self.images.get(id))
    }

    async fn insert_image(
        &self,
        image: NewImage,
        upload_date: DateTime<Utc>,
    ) -> Result<Image, CatalogError> {
        let id = self.images.next_id();
        let row = Image {
            id,
            name: image.name,
            url: image.url,
            category: image.category,
            resolution: image.resolution,
            upload_date,
        };
        self.images.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn list_components(&self, kind: ComponentKind) -> Result<Vec<Component>, CatalogError> {
        Ok(self.components(kind).list())
    }

    async fn get_component(
        &self,
        kind: ComponentKind,
        id: CatalogId,
    ) -> Result<Option<Component>, CatalogError> {
        Ok(self.components(kind).get(id))
    }

    async fn insert_component(
        &self,
        kind: ComponentKind,
        component: NewComponent,
    ) -> Result<Component, CatalogError> {
        let table = self.components(kind);
        let id = table.next_id();
        if !table.claim_code(&component.code, id) {
            return Err(CatalogError::Conflict(format!(
                "{kind} code {}",
                component.code
            )));
        }
        let row = Component {
            id,
            code: component.code,
            name: component.name,
            description: component.description,
            image_id: component.image_id,
        };
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn set_component_image(
        &self,
        kind: ComponentKind,
        id: CatalogId,
        image_id: Option<CatalogId>,
    ) -> Result<bool, CatalogError> {
        match self.components(kind).rows.get_mut(&id) {
            Some(mut row) => {
                row.image_id = image_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_lenses(&self) -> Result<Vec<Lens>, CatalogError> {
        Ok(self.lenses.list())
    }

    async fn get_lens(&self, id: CatalogId) -> Result<Option<Lens>, CatalogError> {
        Ok(self.lenses.get(id))
    }

    async fn insert_lens(&self, lens: NewLens) -> Result<Lens, CatalogError> {
        let id = self.lenses.next_id();
        if let Some(edi_code) = lens.edi_code.as_deref() {
            if !self.lenses.claim_code(edi_code, id) {
                return Err(CatalogError::Conflict(format!("lens edi code {edi_code}")));
            }
        }
        let row = Lens {
            id,
            name: lens.name,
            description: lens.description,
            edi_code: lens.edi_code,
            design_id: lens.design_id,
            material_id: lens.material_id,
            treatment_id: lens.treatment_id,
        };
        self.lenses.rows.insert(id, row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_component(code: &str) -> NewComponent {
        NewComponent {
            code: code.to_string(),
            name: Some(format!("{code} name")),
            description: None,
            image_id: None,
        }
    }

    #[tokio::test]
    async fn components_are_listed_in_insertion_order_per_kind() {
        let repo = MemoryCatalogRepo::new();
        repo.insert_component(ComponentKind::Design, new_component("PROG"))
            .await
            .unwrap();
        repo.insert_component(ComponentKind::Design, new_component("UNIF"))
            .await
            .unwrap();
        repo.insert_component(ComponentKind::Material, new_component("ORMA"))
            .await
            .unwrap();

        let designs = repo.list_components(ComponentKind::Design).await.unwrap();
        let codes: Vec<_> = designs.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, ["PROG", "UNIF"]);
        assert_eq!(repo.list_components(ComponentKind::Material).await.unwrap().len(), 1);
        assert!(repo.list_components(ComponentKind::Treatment).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_component_code_conflicts_within_a_kind_only() {
        let repo = MemoryCatalogRepo::new();
        repo.insert_component(ComponentKind::Design, new_component("X1"))
            .await
            .unwrap();

        let dup = repo
            .insert_component(ComponentKind::Design, new_component("X1"))
            .await;
        assert!(matches!(dup, Err(CatalogError::Conflict(_))));

        repo.insert_component(ComponentKind::Treatment, new_component("X1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn set_component_image_reports_missing_rows() {
        let repo = MemoryCatalogRepo::new();
        let design = repo
            .insert_component(ComponentKind::Design, new_component("PROG"))
            .await
            .unwrap();

        assert!(repo
            .set_component_image(ComponentKind::Design, design.id, Some(CatalogId(9)))
            .await
            .unwrap());
        let stored = repo
            .get_component(ComponentKind::Design, design.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.image_id, Some(CatalogId(9)));

        assert!(!repo
            .set_component_image(ComponentKind::Material, design.id, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn lenses_without_edi_code_never_conflict() {
        let repo = MemoryCatalogRepo::new();
        let lens = |edi: Option<&str>| NewLens {
            name: "Single vision".to_string(),
            description: None,
            edi_code: edi.map(str::to_string),
            design_id: None,
            material_id: None,
            treatment_id: None,
        };

        repo.insert_lens(lens(None)).await.unwrap();
        repo.insert_lens(lens(None)).await.unwrap();
        repo.insert_lens(lens(Some("EDI-1"))).await.unwrap();
        assert!(matches!(
            repo.insert_lens(lens(Some("EDI-1"))).await,
            Err(CatalogError::Conflict(_))
        ));
        assert_eq!(repo.list_lenses().await.unwrap().len(), 3);
    }
}
