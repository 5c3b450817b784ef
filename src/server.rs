use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::Duration;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::config::Config;
use crate::content_cache::{ContentCache, Expire};
use crate::post_processor::{render_list, render_missing, render_post, RenderedList, Templates};
use crate::query_string::QueryString;
use crate::source::prismic::PrismicSource;
use crate::source::SourceError;

struct AppState {
    config: Config,
    templates: Templates,
    source: PrismicSource,
    cache: Mutex<ContentCache<String>>,
}

impl AppState {
    fn cache(&self) -> MutexGuard<'_, ContentCache<String>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expire(&self) -> Expire {
        Expire::After(Duration::seconds(self.config.defaults.revalidate_secs))
    }

    fn store_post(&self, uid: &str, rendered: String) -> Arc<String> {
        let mut cache = self.cache();
        cache.purge();
        cache.add_post(uid, rendered, self.expire())
    }

    fn store_list(&self, pages: u32, rendered: String) -> Arc<String> {
        let mut cache = self.cache();
        cache.purge();
        cache.add_list(pages, rendered, self.expire())
    }
}

fn html_ok(body: String) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn get_query_string(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or_default())
}

fn list_link(pages: u32, reference: Option<&str>) -> String {
    let pages = pages.to_string();
    let params: Vec<(&str, &str)> = match reference {
        Some(reference) => vec![("pages", pages.as_str()), ("ref", reference)],
        None => vec![("pages", pages.as_str())],
    };
    format!("/?{}", serde_urlencoded::to_string(&params).unwrap_or_default())
}

// Previews and lists cut short by a failed load are served but not kept
fn is_cacheable(list: &RenderedList, reference: Option<&str>) -> bool {
    reference.is_none() && list.complete
}

// Begin: Redirect region --------
#[web::get("/post/{slug}")]
async fn post_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", format!("/post/{}/", path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

#[web::get("/post/{slug}/")]
async fn view(slug: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let slug = slug.into_inner();

    if let Some(cached) = state.cache().get_post(&slug) {
        return html_ok(cached.as_ref().clone());
    }

    match render_post(&state.source, &state.config, &state.templates, &slug).await {
        Ok(rendered) => {
            let rendered = state.store_post(&slug, rendered);
            html_ok(rendered.as_ref().clone())
        }
        Err(e) => match e.downcast_ref::<SourceError>() {
            Some(SourceError::NotFound(_)) => {
                info!("Post not found: {}", slug);
                let body = render_missing(&state.templates, &slug)
                    .unwrap_or_else(|_| format!("Post {} not found", slug));
                web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(body)
            }
            _ => {
                error!("Error loading post {}: {}", slug, e);
                web::HttpResponse::InternalServerError()
                    .body(format!("Error loading post {}", slug))
            }
        },
    }
}

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = get_query_string(&req);
    let pages = qs.get_pages();
    let reference = qs.get_ref();

    // Previews are rendered per request
    if reference.is_none() {
        if let Some(cached) = state.cache().get_list(pages) {
            return html_ok(cached.as_ref().clone());
        }
    }

    let link_for = |n: u32| list_link(n, reference.as_deref());
    match render_list(&state.source, &state.config, &state.templates, pages, reference.clone(), link_for).await {
        Ok(list) if is_cacheable(&list, reference.as_deref()) => {
            let rendered = state.store_list(pages, list.html);
            html_ok(rendered.as_ref().clone())
        }
        Ok(list) => html_ok(list.html),
        Err(e) => {
            error!("Error listing posts: {}", e);
            web::HttpResponse::InternalServerError()
                .body("Error listing posts")
        }
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> Result<()> {
    let templates = Templates::load(&config.paths.template_dir)?;
    let source = PrismicSource::new(&config.source)?;

    let cache = if config.defaults.rendering_cache_enabled {
        ContentCache::new()
    } else {
        info!("Rendering cache disabled");
        ContentCache::non_caching()
    };

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    info!("Reading {} documents from {}", config.source.document_type, config.source.endpoint);

    let app_state = Arc::new(AppState {
        config,
        templates,
        source,
        cache: Mutex::new(cache),
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(public_files)
            .service(view)
            .service(post_wo_slash)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await?;

    Ok(())
}
