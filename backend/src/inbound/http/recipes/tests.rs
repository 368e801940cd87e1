//! Tests for recipes API handlers.

use super::*;
use crate::domain::ports::{MockRecipeDirectory, MockTokenIssuer, MockUserDirectory};
use crate::domain::{AffectedRows, Error, RecipeFindResult, RecipeTitle, Role, UserId};
use crate::inbound::http::test_utils::{bearer, claims_for, test_app, test_state, tokens_for};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use pagination::Paginated;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const AUTHOR: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const STRANGER: &str = "9b2d8f0e-1c4a-4e7b-8d3f-5a6b7c8d9e0f";
const RECIPE: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

fn author_id() -> UserId {
    UserId::new(AUTHOR).expect("fixture id")
}

fn recipe_id() -> RecipeId {
    RecipeId::new(RECIPE).expect("fixture id")
}

#[fixture]
fn recipe() -> Recipe {
    let stamp = Utc
        .with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
        .single()
        .expect("instant");
    Recipe {
        id: recipe_id(),
        user_id: author_id(),
        title: RecipeTitle::new("Shakshuka").expect("title"),
        description: None,
        ingredients: vec!["6 eggs".into(), "1 tin tomatoes".into()],
        instructions: "Simmer, crack in the eggs, cover.".into(),
        cook_time_minutes: Some(25),
        created_at: stamp,
        updated_at: stamp,
    }
}

fn signed_in(user: &str, role: Role) -> MockTokenIssuer {
    tokens_for(claims_for(&UserId::new(user).expect("fixture id"), role))
}

async fn send(
    recipes: MockRecipeDirectory,
    tokens: MockTokenIssuer,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let state = test_state(MockUserDirectory::new(), recipes, tokens);
    let app = actix_test::init_service(test_app(state, configure)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[rstest]
#[actix_web::test]
async fn id_takes_precedence_over_user_id(recipe: Recipe) {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find()
        .withf(|lookup: &RecipeLookup| *lookup == RecipeLookup::ById(recipe_id()))
        .times(1)
        .return_once(move |_| Ok(RecipeFindResult::One(recipe)));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/recipes?id={RECIPE}&userId={STRANGER}"))
        .insert_header(bearer());
    let (status, body) = send(recipes, signed_in(STRANGER, Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("id"), Some(&json!(RECIPE)));
    assert_eq!(body.get("userId"), Some(&json!(AUTHOR)));
}

#[rstest]
#[actix_web::test]
async fn author_listing_uses_page_index(recipe: Recipe) {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find()
        .withf(|lookup: &RecipeLookup| match lookup {
            RecipeLookup::ByOwner { user_id, window } => {
                user_id == &author_id() && window.offset() == 20 && window.current_page() == 2
            }
            _ => false,
        })
        .times(1)
        .return_once(move |lookup| {
            let RecipeLookup::ByOwner { window, .. } = lookup else {
                panic!("unexpected lookup");
            };
            Ok(RecipeFindResult::Page(Paginated::new(vec![recipe], 21, window)))
        });

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/recipes?userId={AUTHOR}&page=2&limit=10"))
        .insert_header(bearer());
    let (status, body) = send(recipes, signed_in(STRANGER, Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("currentPage"), Some(&json!(2)));
    assert_eq!(body.get("itemCount"), Some(&json!(10)));
    assert_eq!(body.get("itemsPerPage"), Some(&json!(1)));
}

#[actix_web::test]
async fn listing_everything_without_parameters() {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find()
        .withf(|lookup: &RecipeLookup| {
            matches!(lookup, RecipeLookup::All { window } if window.limit().is_none())
        })
        .times(1)
        .return_once(|_| {
            Ok(RecipeFindResult::Page(Paginated::new(
                Vec::new(),
                0,
                PageWindow::unbounded(),
            )))
        });

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/recipes")
        .insert_header(bearer());
    let (status, body) = send(recipes, signed_in(STRANGER, Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("items"), Some(&json!([])));
}

#[rstest]
#[case::bad_id("id=oops", "id")]
#[case::bad_owner("userId=oops", "userId")]
#[case::limit_too_large("limit=101", "limit")]
#[case::negative_page("page=-1", "query")]
#[actix_web::test]
async fn malformed_queries_are_rejected(#[case] query: &str, #[case] field: &str) {
    let mut recipes = MockRecipeDirectory::new();
    recipes.expect_find().times(0);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/recipes?{query}"))
        .insert_header(bearer());
    let (status, body) = send(recipes, signed_in(STRANGER, Role::User), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field"), Some(&json!(field)));
}

#[actix_web::test]
async fn listing_requires_a_token() {
    let mut recipes = MockRecipeDirectory::new();
    recipes.expect_find().times(0);

    let request = actix_test::TestRequest::get().uri("/api/v1/recipes");
    let (status, _) = send(recipes, MockTokenIssuer::new(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn create_body(user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "title": "  Shakshuka ",
        "ingredients": ["6 eggs", "1 tin tomatoes"],
        "instructions": "Simmer, crack in the eggs, cover.",
        "cookTimeMinutes": 25,
    })
}

#[rstest]
#[actix_web::test]
async fn authors_create_recipes(recipe: Recipe) {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_create()
        .withf(|draft: &RecipeDraft| {
            draft.user_id == author_id()
                && draft.title.as_ref() == "Shakshuka"
                && draft.ingredients.len() == 2
                && draft.cook_time_minutes == Some(25)
        })
        .times(1)
        .return_once(move |_| Ok(recipe));

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/recipes")
        .insert_header(bearer())
        .set_json(create_body(AUTHOR));
    let (status, body) = send(recipes, signed_in(AUTHOR, Role::User), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("title"), Some(&json!("Shakshuka")));
}

#[actix_web::test]
async fn creating_for_someone_else_is_forbidden() {
    let mut recipes = MockRecipeDirectory::new();
    recipes.expect_create().times(0);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/recipes")
        .insert_header(bearer())
        .set_json(create_body(AUTHOR));
    let (status, _) = send(recipes, signed_in(STRANGER, Role::Admin), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case::no_ingredients(json!({"ingredients": []}), "ingredients")]
#[case::blank_title(json!({"title": "   "}), "title")]
#[case::zero_cook_time(json!({"cookTimeMinutes": 0}), "cookTimeMinutes")]
#[actix_web::test]
async fn invalid_drafts_are_rejected(#[case] overrides: Value, #[case] field: &str) {
    let mut recipes = MockRecipeDirectory::new();
    recipes.expect_create().times(0);

    let mut body = create_body(AUTHOR);
    if let (Some(target), Some(patch)) = (body.as_object_mut(), overrides.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/recipes")
        .insert_header(bearer())
        .set_json(body);
    let (status, response) = send(recipes, signed_in(AUTHOR, Role::User), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.pointer("/details/field"), Some(&json!(field)));
}

#[rstest]
#[actix_web::test]
async fn authors_update_their_recipe(recipe: Recipe) {
    let mut updated = recipe.clone();
    updated.title = RecipeTitle::new("Green shakshuka").expect("title");
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find_one()
        .times(1)
        .return_once(move |_| Ok(recipe));
    recipes
        .expect_update()
        .withf(|id: &RecipeId, patch: &RecipePatch| {
            *id == recipe_id()
                && patch.title.as_ref().map(AsRef::as_ref) == Some("Green shakshuka")
        })
        .times(1)
        .return_once(move |_, _| Ok(updated));

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/recipes/{RECIPE}"))
        .insert_header(bearer())
        .set_json(json!({"title": "Green shakshuka"}));
    let (status, body) = send(recipes, signed_in(AUTHOR, Role::User), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("title"), Some(&json!("Green shakshuka")));
}

#[rstest]
#[actix_web::test]
async fn strangers_cannot_update(recipe: Recipe) {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find_one()
        .times(1)
        .return_once(move |_| Ok(recipe));
    recipes.expect_update().times(0);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/recipes/{RECIPE}"))
        .insert_header(bearer())
        .set_json(json!({"title": "Mine now"}));
    let (status, body) = send(recipes, signed_in(STRANGER, Role::Admin), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body.get("code"), Some(&json!("forbidden")));
}

#[actix_web::test]
async fn updating_a_missing_recipe_is_404() {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find_one()
        .times(1)
        .return_once(|_| Err(Error::not_found("recipe not found")));
    recipes.expect_update().times(0);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/recipes/{RECIPE}"))
        .insert_header(bearer())
        .set_json(json!({"title": "Anything"}));
    let (status, _) = send(recipes, signed_in(AUTHOR, Role::User), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_updates_are_rejected_before_lookup() {
    let mut recipes = MockRecipeDirectory::new();
    recipes.expect_find_one().times(0);
    recipes.expect_update().times(0);

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/recipes/{RECIPE}"))
        .insert_header(bearer())
        .set_json(json!({}));
    let (status, body) = send(recipes, signed_in(AUTHOR, Role::User), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field"), Some(&json!("body")));
}

#[rstest]
#[case::author(AUTHOR, StatusCode::OK, 1)]
#[case::stranger(STRANGER, StatusCode::FORBIDDEN, 0)]
#[actix_web::test]
async fn only_authors_delete(
    recipe: Recipe,
    #[case] caller: &str,
    #[case] expected: StatusCode,
    #[case] calls: usize,
) {
    let mut recipes = MockRecipeDirectory::new();
    recipes
        .expect_find_one()
        .times(1)
        .return_once(move |_| Ok(recipe));
    recipes
        .expect_delete()
        .times(calls)
        .returning(|_| Ok(AffectedRows::new(1)));

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/recipes/{RECIPE}"))
        .insert_header(bearer());
    let (status, _) = send(recipes, signed_in(caller, Role::User), request).await;
    assert_eq!(status, expected);
}
