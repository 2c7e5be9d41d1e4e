mod common;

use axum::http::StatusCode;
use serde_json::json;

fn sample_recipe() -> serde_json::Value {
    json!({
        "title": "Chocolate cheesecake",
        "time_minutes": 30,
        "price": 5.25,
        "link": "https://example.com/recipe.pdf"
    })
}

#[tokio::test]
async fn auth_required_for_recipes() {
    let app = common::spawn_app().await;

    let (status, _body) = app.request("GET", "/api/recipes", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_recipe() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;

    let recipe = app.create_recipe(&token, sample_recipe()).await;

    assert_eq!(recipe["title"], "Chocolate cheesecake");
    assert_eq!(recipe["time_minutes"], 30);
    assert_eq!(recipe["price"], 5.25);
    assert_eq!(recipe["link"], "https://example.com/recipe.pdf");
    assert!(recipe["description"].is_null());
    assert_eq!(recipe["tags"].as_array().expect("tags").len(), 0);
}

#[tokio::test]
async fn create_recipe_missing_required_fields_fails() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({ "description": "no title" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["title"].is_array(), "field detail: {body}");
    assert!(body["fields"]["time_minutes"].is_array(), "field detail: {body}");
    assert!(body["fields"]["price"].is_array(), "field detail: {body}");

    let (_, body) = app.request("GET", "/api/recipes", Some(&token), None).await;
    assert_eq!(body.as_array().expect("recipe list").len(), 0);
}

#[tokio::test]
async fn create_recipe_with_negative_values_fails() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({ "title": "Soup", "time_minutes": -5, "price": -1.0 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["time_minutes"].is_array(), "field detail: {body}");
    assert!(body["fields"]["price"].is_array(), "field detail: {body}");
}

#[tokio::test]
async fn create_recipe_with_tags() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let vegan = app.create_tag(&token, "Vegan").await;
    let dessert = app.create_tag(&token, "Dessert").await;

    let mut payload = sample_recipe();
    payload["tags"] = json!([vegan["id"], dessert["id"]]);
    let recipe = app.create_recipe(&token, payload).await;

    let names: Vec<&str> = recipe["tags"]
        .as_array()
        .expect("tags")
        .iter()
        .map(|t| t["name"].as_str().expect("tag name"))
        .collect();
    assert_eq!(names, vec!["Vegan", "Dessert"]);
}

#[tokio::test]
async fn create_recipe_with_foreign_tag_fails() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let other_token = app.register_and_login("mary@example.com").await;
    let foreign_tag = app.create_tag(&other_token, "Fruity").await;

    let mut payload = sample_recipe();
    payload["tags"] = json!([foreign_tag["id"]]);
    let (status, body) = app
        .request("POST", "/api/recipes", Some(&token), Some(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["tags"].is_array(), "field detail: {body}");

    let (_, body) = app.request("GET", "/api/recipes", Some(&token), None).await;
    assert_eq!(body.as_array().expect("recipe list").len(), 0);
}

#[tokio::test]
async fn recipes_limited_to_user_and_ordered_most_recent_first() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let other_token = app.register_and_login("mary@example.com").await;

    let mut first = sample_recipe();
    first["title"] = json!("First");
    app.create_recipe(&token, first).await;

    let mut second = sample_recipe();
    second["title"] = json!("Second");
    app.create_recipe(&token, second).await;

    let mut foreign = sample_recipe();
    foreign["title"] = json!("Foreign");
    app.create_recipe(&other_token, foreign).await;

    let (status, body) = app.request("GET", "/api/recipes", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .expect("recipe list")
        .iter()
        .map(|r| r["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn retrieve_recipe_detail() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let recipe = app.create_recipe(&token, sample_recipe()).await;
    let url = format!("/api/recipes/{}", recipe["id"]);

    let (status, body) = app.request("GET", &url, Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], recipe["id"]);
    assert_eq!(body["title"], "Chocolate cheesecake");
}

#[tokio::test]
async fn foreign_recipe_is_reported_as_not_found() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let other_token = app.register_and_login("mary@example.com").await;
    let foreign = app.create_recipe(&other_token, sample_recipe()).await;
    let url = format!("/api/recipes/{}", foreign["id"]);

    let (status, _) = app.request("GET", &url, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("PATCH", &url, Some(&token), Some(json!({ "title": "Mine" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", &url, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let recipe = app.create_recipe(&token, sample_recipe()).await;
    let url = format!("/api/recipes/{}", recipe["id"]);

    let (status, body) = app
        .request("PATCH", &url, Some(&token), Some(json!({ "title": "New title" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New title");
    assert_eq!(body["time_minutes"], 30);
    assert_eq!(body["price"], 5.25);
    assert_eq!(body["link"], "https://example.com/recipe.pdf");
    assert_eq!(body["id"], recipe["id"]);
}

#[tokio::test]
async fn partial_update_replaces_tag_links() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let breakfast = app.create_tag(&token, "Breakfast").await;
    let lunch = app.create_tag(&token, "Lunch").await;

    let mut payload = sample_recipe();
    payload["tags"] = json!([breakfast["id"]]);
    let recipe = app.create_recipe(&token, payload).await;
    let url = format!("/api/recipes/{}", recipe["id"]);

    let (status, body) = app
        .request(
            "PATCH",
            &url,
            Some(&token),
            Some(json!({ "tags": [lunch["id"]] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let tags = body["tags"].as_array().expect("tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "Lunch");
}

#[tokio::test]
async fn full_update_resets_absent_optional_fields() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let tag = app.create_tag(&token, "Dessert").await;

    let mut payload = sample_recipe();
    payload["description"] = json!("Rich and creamy");
    payload["tags"] = json!([tag["id"]]);
    let recipe = app.create_recipe(&token, payload).await;
    let url = format!("/api/recipes/{}", recipe["id"]);

    let (status, body) = app
        .request(
            "PUT",
            &url,
            Some(&token),
            Some(json!({ "title": "Plain cake", "time_minutes": 20, "price": 3.0 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Plain cake");
    assert!(body["description"].is_null());
    assert!(body["link"].is_null());
    assert_eq!(body["tags"].as_array().expect("tags").len(), 0);
}

#[tokio::test]
async fn delete_recipe() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let recipe = app.create_recipe(&token, sample_recipe()).await;
    let url = format!("/api/recipes/{}", recipe["id"]);

    let (status, body) = app.request("DELETE", &url, Some(&token), None).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null(), "delete body should be empty");

    let (_, body) = app.request("GET", "/api/recipes", Some(&token), None).await;
    assert_eq!(body.as_array().expect("recipe list").len(), 0);

    let (status, _) = app.request("DELETE", &url, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_tag_detaches_it_from_recipes() {
    let app = common::spawn_app().await;
    let token = app.register_and_login("user@example.com").await;
    let tag = app.create_tag(&token, "Dessert").await;

    let mut payload = sample_recipe();
    payload["tags"] = json!([tag["id"]]);
    let recipe = app.create_recipe(&token, payload).await;

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/tags/{}", tag["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/recipes/{}", recipe["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"].as_array().expect("tags").len(), 0);
}
