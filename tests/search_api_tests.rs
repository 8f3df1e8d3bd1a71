use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use atelier::api::search::CACHE_HEADER;
use atelier::config::Config;
use atelier::db::{DEFAULT_API_KEY, Store};
use atelier::models::content::{
    ArticleInput, ArticleStatus, PortfolioItemInput, ProjectStatus, ServicePageInput,
};
use atelier::state::SharedState;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Router, Store) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let store = shared.store.clone();
    let state = atelier::api::create_app_state(shared, None);
    (atelier::api::router(state), store)
}

fn article(title: &str, slug: &str, status: ArticleStatus) -> ArticleInput {
    ArticleInput {
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: None,
        cover_image: None,
        status,
        published_at: Some("2024-03-01T00:00:00Z".to_string()),
        author_id: None,
    }
}

fn project(title: &str, slug: &str, tags: &[&str], status: ProjectStatus) -> PortfolioItemInput {
    PortfolioItemInput {
        title: title.to_string(),
        slug: slug.to_string(),
        description: None,
        cover_image: None,
        category: "web".to_string(),
        tags: tags.iter().map(ToString::to_string).collect(),
        status,
    }
}

async fn get(app: &Router, uri: &str, api_key: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn cache_header(response: &Response) -> String {
    response
        .headers()
        .get(CACHE_HEADER)
        .expect("missing X-Cache header")
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_short_query_returns_empty_miss() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("A guide", "a-guide", ArticleStatus::Published))
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=%20a%20", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache_header(&response), "MISS");

    let json = body_json(response).await;
    assert_eq!(json["totalResults"], 0);
    assert_eq!(json["posts"].as_array().unwrap().len(), 0);
    assert_eq!(json["projects"].as_array().unwrap().len(), 0);
    assert_eq!(json["services"].as_array().unwrap().len(), 0);
    assert_eq!(json["query"], "a");

    let response = get(&app, "/api/search", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["totalResults"], 0);
}

#[tokio::test]
async fn test_drafts_only_visible_to_privileged_callers() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("Secret roadmap", "secret-roadmap", ArticleStatus::Draft))
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=roadmap", None).await;
    let json = body_json(response).await;
    assert_eq!(json["totalResults"], 0);

    let response = get(&app, "/api/search?q=roadmap", Some(DEFAULT_API_KEY)).await;
    assert_eq!(cache_header(&response), "MISS");
    let json = body_json(response).await;
    assert_eq!(json["totalResults"], 1);
    assert_eq!(json["posts"][0]["slug"], "secret-roadmap");
    assert_eq!(json["posts"][0]["status"], "draft");

    // The anonymous cache entry must not have been overwritten
    let response = get(&app, "/api/search?q=roadmap", None).await;
    assert_eq!(cache_header(&response), "HIT");
    assert_eq!(body_json(response).await["totalResults"], 0);
}

#[tokio::test]
async fn test_repeat_request_is_cached_byte_identical() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("Rust at the edge", "rust-edge", ArticleStatus::Published))
        .await
        .unwrap();

    let first = get(&app, "/api/search?q=rust&limit=3", None).await;
    assert_eq!(cache_header(&first), "MISS");
    let first = body_bytes(first).await;

    store
        .add_post(&article("More rust", "more-rust", ArticleStatus::Published))
        .await
        .unwrap();

    let second = get(&app, "/api/search?q=RUST&limit=3", None).await;
    assert_eq!(cache_header(&second), "HIT");
    assert_eq!(
        second.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(second).await, first);

    let other_limit = get(&app, "/api/search?q=rust&limit=4", None).await;
    assert_eq!(cache_header(&other_limit), "MISS");
    assert_eq!(body_json(other_limit).await["totalResults"], 2);
}

#[tokio::test]
async fn test_web_design_excludes_archived_project() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article(
            "Web Design Trends 2024",
            "web-design-trends-2024",
            ArticleStatus::Published,
        ))
        .await
        .unwrap();
    store
        .add_project(&project(
            "Old storefront",
            "old-storefront",
            &["web"],
            ProjectStatus::Archived,
        ))
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=web%20design", None).await;
    let json = body_json(response).await;

    assert_eq!(json["totalResults"], 1);
    assert_eq!(json["posts"][0]["title"], "Web Design Trends 2024");
    assert_eq!(json["projects"].as_array().unwrap().len(), 0);
    assert_eq!(json["query"], "web design");
}

#[tokio::test]
async fn test_no_match_is_cached_after_miss() {
    let (app, _store) = spawn_app().await;

    let response = get(&app, "/api/search?q=ab", None).await;
    assert_eq!(cache_header(&response), "MISS");
    assert_eq!(body_json(response).await["totalResults"], 0);

    let response = get(&app, "/api/search?q=ab", None).await;
    assert_eq!(cache_header(&response), "HIT");
}

#[tokio::test]
async fn test_project_matched_by_text_and_tag_appears_once() {
    let (app, store) = spawn_app().await;
    store
        .add_project(&project(
            "Branding for Acme",
            "branding-acme",
            &["branding", "print"],
            ProjectStatus::Completed,
        ))
        .await
        .unwrap();
    store
        .add_project(&project(
            "Museum wayfinding",
            "museum-wayfinding",
            &["branding"],
            ProjectStatus::Active,
        ))
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=branding", None).await;
    let json = body_json(response).await;

    let slugs: Vec<&str> = json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs.len(), 2);
    assert!(slugs.contains(&"branding-acme"));
    assert!(slugs.contains(&"museum-wayfinding"));
    assert_eq!(json["totalResults"], 2);
}

#[tokio::test]
async fn test_type_filter_and_service_content_fill() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("Web performance", "web-performance", ArticleStatus::Published))
        .await
        .unwrap();
    store
        .add_service_page(&ServicePageInput {
            title: "Hosting".to_string(),
            slug: "hosting".to_string(),
            description: None,
            content: "Managed web hosting with daily backups.".to_string(),
            published: true,
        })
        .await
        .unwrap();
    store
        .add_service_page(&ServicePageInput {
            title: "Web audits".to_string(),
            slug: "web-audits".to_string(),
            description: None,
            content: "Unpublished draft".to_string(),
            published: false,
        })
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=web&type=services", None).await;
    let json = body_json(response).await;

    assert_eq!(json["posts"].as_array().unwrap().len(), 0);
    assert_eq!(json["projects"].as_array().unwrap().len(), 0);
    assert_eq!(json["services"].as_array().unwrap().len(), 1);
    assert_eq!(json["services"][0]["slug"], "hosting");
    assert_eq!(json["totalResults"], 1);

    // Unknown type searches everything
    let response = get(&app, "/api/search?q=web&type=pages", None).await;
    assert_eq!(body_json(response).await["totalResults"], 2);
}

#[tokio::test]
async fn test_limit_defaults_and_clamps() {
    let (app, store) = spawn_app().await;
    for i in 0..25 {
        store
            .add_post(&article(
                &format!("Field note {i}"),
                &format!("field-note-{i}"),
                ArticleStatus::Published,
            ))
            .await
            .unwrap();
    }

    let response = get(&app, "/api/search?q=note", None).await;
    assert_eq!(body_json(response).await["posts"].as_array().unwrap().len(), 5);

    let response = get(&app, "/api/search?q=note&limit=500", None).await;
    assert_eq!(body_json(response).await["posts"].as_array().unwrap().len(), 20);

    let response = get(&app, "/api/search?q=note&limit=abc", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["posts"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_cache_admin_endpoints() {
    let (app, _store) = spawn_app().await;

    let response = get(&app, "/api/search/cache", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/search/cache", Some("wrong-key")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    get(&app, "/api/search?q=anything", None).await;

    let response = get(&app, "/api/search/cache", Some(DEFAULT_API_KEY)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["entries"], 1);
    assert_eq!(json["data"]["capacity"], 100);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/search/cache")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["removed"], 1);

    let response = get(&app, "/api/search?q=anything", None).await;
    assert_eq!(cache_header(&response), "MISS");
}

#[tokio::test]
async fn test_member_cannot_manage_cache() {
    let (app, store) = spawn_app().await;
    let member = store
        .create_user(
            "reader",
            "hunter22",
            atelier::models::user::Role::Member,
            &Config::default().security,
        )
        .await
        .unwrap();

    let response = get(&app, "/api/search/cache", Some(&member.api_key)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    store
        .add_post(&article("Draft notes", "draft-notes", ArticleStatus::Draft))
        .await
        .unwrap();
    let response = get(&app, "/api/search?q=notes", Some(&member.api_key)).await;
    assert_eq!(body_json(response).await["totalResults"], 0);
}

#[tokio::test]
async fn test_non_ascii_text_matches_case_insensitively() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("Études de cas", "etudes-de-cas", ArticleStatus::Published))
        .await
        .unwrap();
    store
        .add_project(&project(
            "Bakery rebrand",
            "bakery-rebrand",
            &["Café", "print"],
            ProjectStatus::Active,
        ))
        .await
        .unwrap();
    store
        .add_service_page(&ServicePageInput {
            title: "Localisation".to_string(),
            slug: "localisation".to_string(),
            description: None,
            content: "Sites multilingues pour l'ÉDITION et la presse.".to_string(),
            published: true,
        })
        .await
        .unwrap();

    for q in ["%C3%89tudes", "%C3%A9tudes", "%C3%89TUDES"] {
        let response = get(&app, &format!("/api/search?q={q}&type=posts"), None).await;
        let json = body_json(response).await;
        assert_eq!(json["totalResults"], 1, "q={q}");
        assert_eq!(json["posts"][0]["slug"], "etudes-de-cas");
    }

    let response = get(&app, "/api/search?q=CAF%C3%89&type=projects", None).await;
    let json = body_json(response).await;
    assert_eq!(json["projects"][0]["slug"], "bakery-rebrand");
    assert_eq!(json["projects"][0]["tags"][0], "Café");

    let response = get(&app, "/api/search?q=%C3%A9dition&type=services", None).await;
    assert_eq!(body_json(response).await["services"][0]["slug"], "localisation");
}

#[tokio::test]
async fn test_repeated_query_keys_still_get_json() {
    let (app, store) = spawn_app().await;
    store
        .add_post(&article("Web performance", "web-performance", ArticleStatus::Published))
        .await
        .unwrap();

    let response = get(&app, "/api/search?q=web&q=design&limit=2&limit=x", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache_header(&response), "MISS");
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    assert_eq!(json["query"], "web");
    assert_eq!(json["totalResults"], 1);

    let response = get(&app, "/api/search?&&q=&=x", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["totalResults"], 0);
}
