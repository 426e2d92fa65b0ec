use super::catalog_handler;
use super::frontend::STATE_COOKIE;
use super::gate::with_identity;
use super::handler::{self, CallbackQuery, RefreshRequest};
use crate::application_port::CatalogService;
use crate::domain_model::{CatalogId, ComponentKind};
use crate::server::Server;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::hyper::body::Bytes;
use warp::{Filter, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Everything under `/api`. Path filters come before method filters so an
/// unknown path is a 404 rather than a 405.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("api").and(auth_routes(server.clone()).or(catalog_routes(server)))
}

fn auth_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path!("auth" / "login")
        .and(warp::get())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let callback = warp::path!("auth" / "callback")
        .and(warp::get())
        .and(warp::query::<CallbackQuery>())
        .and(warp::cookie::optional::<String>(STATE_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with(server.frontend.clone()))
        .and_then(handler::callback);

    let refresh = warp::path!("auth" / "refresh")
        .and(warp::post())
        .and(lenient_json::<RefreshRequest>())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and(lenient_json::<RefreshRequest>())
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let me = warp::path!("auth" / "me")
        .and(warp::get())
        .and(with_identity(server.auth_service.clone()))
        .and_then(handler::me);

    login.or(callback).or(refresh).or(logout).or(me)
}

fn catalog_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let catalog = server.catalog_service.clone();

    let list_images = warp::path!("images")
        .and(warp::get())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::list_images);

    let get_image = warp::path!("images" / CatalogId)
        .and(warp::get())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::get_image);

    let create_image = warp::path!("images")
        .and(warp::post())
        .and(json_body())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::create_image);

    let list_lenses = warp::path!("lenses")
        .and(warp::get())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::list_lenses);

    let get_lens = warp::path!("lenses" / CatalogId)
        .and(warp::get())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::get_lens);

    let create_lens = warp::path!("lenses")
        .and(warp::post())
        .and(json_body())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::create_lens);

    let link = warp::path!("link")
        .and(warp::post())
        .and(json_body())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::link_image);

    let unlink = warp::path!("unlink")
        .and(warp::post())
        .and(json_body())
        .and(with(catalog.clone()))
        .and_then(catalog_handler::unlink_image);

    list_images
        .or(get_image)
        .or(create_image)
        .or(component_routes("designs", ComponentKind::Design, catalog.clone()))
        .or(component_routes("treatments", ComponentKind::Treatment, catalog.clone()))
        .or(component_routes("materials", ComponentKind::Material, catalog))
        .or(list_lenses)
        .or(get_lens)
        .or(create_lens)
        .or(link)
        .or(unlink)
}

fn component_routes(
    segment: &'static str,
    kind: ComponentKind,
    catalog: Arc<dyn CatalogService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let base = warp::path(segment).and(warp::path::end());

    let list = base
        .and(warp::get())
        .map(move || kind)
        .and(with(catalog.clone()))
        .and_then(catalog_handler::list_components);

    let create = base
        .and(warp::post())
        .map(move || kind)
        .and(json_body())
        .and(with(catalog))
        .and_then(catalog_handler::create_component);

    list.or(create)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn json_body<T: DeserializeOwned + Send>()
-> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// A JSON body that may be absent or malformed; either case yields `None`.
///
/// A missing or unreadable `Content-Length` also counts as no body, and the
/// body is then left unread. Oversized bodies are still 413.
fn lenient_json<T: DeserializeOwned + Send>()
-> impl Filter<Extract = (Option<T>,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES)
        .and(warp::body::bytes())
        .map(|body: Bytes| serde_json::from_slice::<T>(&body).ok())
        .or_else(|rejection: warp::Rejection| async move {
            if rejection.find::<reject::LengthRequired>().is_some() {
                Ok((None,))
            } else {
                Err(rejection)
            }
        })
}
