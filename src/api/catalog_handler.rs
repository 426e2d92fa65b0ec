use crate::api::error::ApiErrorCode;
use crate::api::response::ApiResponse;
use crate::application_port::CatalogService;
use crate::domain_model::*;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Reply, reject};

fn to_rejection(error: crate::application_port::CatalogError) -> warp::Rejection {
    reject::custom(ApiErrorCode::from(error))
}

fn created<T: serde::Serialize>(row: T) -> impl Reply {
    warp::reply::with_status(warp::reply::json(&row), StatusCode::CREATED)
}

pub async fn list_images(
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let images = catalog_service.list_images().await.map_err(to_rejection)?;
    Ok(warp::reply::json(&images))
}

pub async fn get_image(
    id: CatalogId,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let image = catalog_service.get_image(id).await.map_err(to_rejection)?;
    Ok(warp::reply::json(&image))
}

pub async fn create_image(
    body: NewImage,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let image = catalog_service.create_image(body).await.map_err(to_rejection)?;
    Ok(created(image))
}

pub async fn list_components(
    kind: ComponentKind,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let rows = catalog_service
        .list_components(kind)
        .await
        .map_err(to_rejection)?;
    Ok(warp::reply::json(&rows))
}

pub async fn create_component(
    kind: ComponentKind,
    body: NewComponent,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let row = catalog_service
        .create_component(kind, body)
        .await
        .map_err(to_rejection)?;
    Ok(created(row))
}

pub async fn list_lenses(
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let lenses = catalog_service.list_lenses().await.map_err(to_rejection)?;
    Ok(warp::reply::json(&lenses))
}

pub async fn get_lens(
    id: CatalogId,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let lens = catalog_service.get_lens(id).await.map_err(to_rejection)?;
    Ok(warp::reply::json(&lens))
}

pub async fn create_lens(
    body: NewLens,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    let lens = catalog_service.create_lens(body).await.map_err(to_rejection)?;
    Ok(created(lens))
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub id: CatalogId,
    pub image_id: CatalogId,
}

#[derive(Debug, Deserialize)]
pub struct UnlinkRequest {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub id: CatalogId,
}

pub async fn link_image(
    body: LinkRequest,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    catalog_service
        .link_image(body.kind, body.id, body.image_id)
        .await
        .map_err(to_rejection)?;
    Ok(warp::reply::json(&ApiResponse::done()))
}

pub async fn unlink_image(
    body: UnlinkRequest,
    catalog_service: Arc<dyn CatalogService>,
) -> Result<impl Reply, warp::Rejection> {
    catalog_service
        .unlink_image(body.kind, body.id)
        .await
        .map_err(to_rejection)?;
    Ok(warp::reply::json(&ApiResponse::done()))
}
