//! Main server context.

use mappress_doc::providers::ProviderCatalog;
use mappress_sqlite::MappressPool;
use mappress_sqlite::traits::*;
use mappress_util::extract_headers;
use mappress_util::http::{HttpServer, StatusCode};
use handlebars::Handlebars;
use rouille::{Request, Response, router};
use log::*;

use crate::aggregator::MarkerAggregator;
use crate::config::Config;
use crate::errors::*;
use crate::metabox::{form_value, MapMetabox, Metabox, SaveOutcome};
use crate::tmpl::TemplateContext;
use crate::types::{Post, User};

pub struct App {
    hbs: Handlebars,
    pool: MappressPool,
    agg: MarkerAggregator,
    /// Editor panels, in display order. This is the composition point the
    /// host's hook table used to be: anything implementing `Metabox` gets
    /// rendered into the edit page and handed the submitted form.
    metaboxes: Vec<Box<dyn Metabox>>
}

impl App {
    pub fn new(cfg: &Config, pool: MappressPool, hbs: Handlebars) -> Result<Self> {
        let catalog = ProviderCatalog::bundled()?;
        let agg = MarkerAggregator::new(pool.clone(), &cfg.public_url);
        let metaboxes: Vec<Box<dyn Metabox>> = vec![
            Box::new(MapMetabox::new(&catalog))
        ];
        Ok(App { hbs, pool, agg, metaboxes })
    }

    /// Identifies the requesting user from the `X-mappress-user` header.
    fn authed_user(&self, req: &Request) -> WebResult<User> {
        extract_headers!(req, WebError::Denied,
                         let user_id: i64 => "user");
        let db = self.pool.get()?;
        User::by_id(&db, user_id)?
            .ok_or(WebError::Denied)
    }

    fn index(&self) -> WebResult<Response> {
        use crate::templates::index::{IndexView, PostSummary};

        let db = self.pool.get()?;
        let posts = Post::from_select(&db, "WHERE kind = ? ORDER BY created DESC",
                                      &[&Post::KIND_POST])?;
        let posts = posts.iter()
            .map(|p| PostSummary::from_post(p, self.agg.base_url()))
            .collect();
        TemplateContext {
            template: "index",
            title: "Radio Free MapPress".into(),
            body: IndexView { posts }
        }.render(&self.hbs)
    }

    fn post_page(&self, id: i64) -> WebResult<Response> {
        use crate::templates::post::PostView;

        let db = self.pool.get()?;
        let post = Post::by_id(&db, id)?
            .ok_or(WebError::NotFound)?;
        TemplateContext {
            template: "post",
            title: post.title.clone().into(),
            body: PostView::from_post(&post)
        }.render(&self.hbs)
    }

    fn map_page(&self) -> WebResult<Response> {
        use crate::templates::map::MapView;

        let markers_json = self.agg.markers_json()?;
        let has_markers = markers_json != "[]";
        TemplateContext {
            template: "map",
            title: "Map".into(),
            body: MapView { markers_json, has_markers }
        }.render(&self.hbs)
    }

    fn edit_page(&self, req: &Request, id: i64) -> WebResult<Response> {
        use crate::templates::edit::EditView;

        let user = self.authed_user(req)?;
        let db = self.pool.get()?;
        let post = Post::by_id(&db, id)?
            .ok_or(WebError::NotFound)?;
        let mut fragments = vec![];
        for mb in self.metaboxes.iter() {
            fragments.push(mb.render(&db, &self.hbs, &post, &user)?);
        }
        TemplateContext {
            template: "edit",
            title: format!("Editing: {}", post.title).into(),
            body: EditView {
                id: post.id,
                title: post.title.clone(),
                metaboxes: fragments
            }
        }.render(&self.hbs)
    }

    fn save_metaboxes(&self, req: &Request, id: i64) -> WebResult<Response> {
        let user = self.authed_user(req)?;
        let db = self.pool.get()?;
        let post = Post::by_id(&db, id)?
            .ok_or(WebError::NotFound)?;
        let form = rouille::input::post::raw_urlencoded_post_input(req)
            .map_err(|_| WebError::BadRequest)?;
        let mut saved = 0;
        for mb in self.metaboxes.iter() {
            if mb.save(&db, &post, &user, &form)? == SaveOutcome::Saved {
                saved += 1;
            }
        }
        info!("Post #{} edited by {}: {} metabox(es) stored", post.id, user.name, saved);
        Ok(Response::redirect_303(format!("/post/{}/edit", post.id)))
    }

    /// The popup content endpoint. Anything that doesn't add up (wrong
    /// action, bad or unknown id) is simply ignored with an empty body.
    fn fetch_map_post(&self, req: &Request) -> WebResult<Response> {
        use crate::templates::post::PostContentView;

        let form = rouille::input::post::raw_urlencoded_post_input(req)
            .map_err(|_| WebError::BadRequest)?;
        if form_value(&form, "action") != Some("fetch_map_post") {
            return Ok(Response::text(""));
        }
        let id = match form_value(&form, "id").and_then(|x| x.parse::<i64>().ok()) {
            Some(id) => id,
            None => return Ok(Response::text(""))
        };
        let db = self.pool.get()?;
        let post = match Post::by_id(&db, id)? {
            Some(p) => p,
            None => return Ok(Response::text(""))
        };
        let html = self.hbs.render("post_content", &PostContentView::from_post(&post))?;
        Ok(Response::html(html))
    }
}

impl HttpServer for App {
    type Error = WebError;

    fn on_request(&self, req: &Request) -> WebResult<Response> {
        router!(req,
            (GET) (/) => {
                self.index()
            },
            (GET) (/map) => {
                self.map_page()
            },
            (GET) (/post/{id: i64}) => {
                self.post_page(id)
            },
            (GET) (/post/{id: i64}/edit) => {
                self.edit_page(req, id)
            },
            (POST) (/post/{id: i64}/metabox) => {
                self.save_metaboxes(req, id)
            },
            (POST) (/ajax) => {
                self.fetch_map_post(req)
            },
            _ => {
                let asset_resp = rouille::match_assets(req, "static");
                if asset_resp.is_success() {
                    Ok(asset_resp)
                }
                else {
                    Err(WebError::NotFound)
                }
            }
        )
    }
    fn process_request(&self, req: &Request) -> Response {
        use std::time::Instant;

        let start = Instant::now();
        let ret = self.on_request(req);
        let ret = match ret {
            Ok(r) => r,
            Err(e) => {
                warn!("Processing request failed ({}): {}", e.status_code(), e);
                let resp = e.as_rendered(req, &self.hbs);
                match resp {
                    Ok(r) => r,
                    Err(e) => {
                        error!("Rendering error response failed: {}", e);
                        Response::text("Something's catastrophically broken!")
                            .with_status_code(500)
                    }
                }
            }
        };
        let dur = start.elapsed();
        info!("{} {} \"{}\" - {} [{}.{:03}s]", req.remote_addr(), req.method(), req.raw_url(), ret.status_code, dur.as_secs(), dur.subsec_millis());
        ret
    }
}
