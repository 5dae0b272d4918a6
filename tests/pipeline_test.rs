use mockito::{Matcher, Server, ServerGuard};
use recipe_wildcard::providers::GoogleProvider;
use recipe_wildcard::{
    FreeFormRequest, GenerationRequest, IngestError, IngestionRun, IngredientDraft, Orchestrator,
    PipelineState, ProviderErrorKind, RecipeDraft, RecipeSource,
};
use serde_json::json;

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

const PANCAKE_PAGE_TEXT: &str = "Fluffy pancakes. Whisk 2 cups flour with 2 eggs and 1.5 cups milk. \
Rest the batter ten minutes, then fry ladlefuls in butter until golden on both sides.";

/// Gemini response wrapping `reply` as the model text
fn gemini_body(reply: &str) -> String {
    json!({
        "candidates": [{"content": {"parts": [{"text": reply}]}}]
    })
    .to_string()
}

async fn mock_model(server: &mut ServerGuard, reply: &str) -> mockito::Mock {
    server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(reply))
        .create_async()
        .await
}

fn orchestrator(server: &ServerGuard, api_key: &str) -> Orchestrator {
    let provider = GoogleProvider::with_base_url(
        api_key.to_string(),
        server.url(),
        "gemini-2.5-flash".to_string(),
    );
    Orchestrator::new(Box::new(provider))
}

fn dinner() -> RecipeDraft {
    let mut draft = RecipeDraft::manual("Weeknight Pasta");
    draft.source = RecipeSource::AiGenerated;
    draft.push_ingredient(IngredientDraft::new("Spaghetti", "200", "g"));
    draft.push_ingredient(IngredientDraft::new("Garlic", "3", "cloves"));
    draft.push_ingredient(IngredientDraft::new("Olive oil", "3", "tbsp"));
    draft.push_instruction("Boil the pasta.");
    draft.push_instruction("Fry the garlic in oil.");
    draft.push_instruction("Toss together.");
    draft
}

#[tokio::test]
async fn test_generate_assigns_indices_from_position() {
    let mut server = Server::new_async().await;
    let reply = r#"{"title":"Soup","ingredients":[{"name":"Water","quantity":"1","unit":"L","order_index":7},{"name":"Salt","quantity":"1","unit":"tsp"}],"instructions":[{"step_number":9,"content":"Boil"},{"content":"Season"}]}"#;
    let mock = mock_model(&mut server, reply).await;

    let draft = orchestrator(&server, "test-key")
        .generate(FreeFormRequest::new("a simple soup"))
        .await
        .unwrap();

    assert_eq!(draft.title, "Soup");
    assert_eq!(draft.source, RecipeSource::AiGenerated);
    let indices: Vec<u32> = draft.ingredients.iter().map(|i| i.order_index).collect();
    assert_eq!(indices, vec![0, 1]);
    let steps: Vec<u32> = draft.instructions.iter().map(|i| i.step_number).collect();
    assert_eq!(steps, vec![1, 2]);
    assert_eq!(draft.instructions[1].content, "Season");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_tolerates_prose_around_json() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(&mut server, r#"Here you go: {"title":"X"} Enjoy!"#).await;

    let draft = orchestrator(&server, "test-key")
        .generate(FreeFormRequest::new("anything"))
        .await
        .unwrap();

    assert_eq!(draft.title, "X");
    assert!(draft.ingredients.is_empty());
    assert!(draft.instructions.is_empty());
}

#[tokio::test]
async fn test_wildcard_generation_is_tagged_wildcard_modified() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(
        &mut server,
        r#"{"title":"Miso Brownies","ingredients":[{"name":"White miso","quantity":"2","unit":"tbsp","is_wildcard":true,"wildcard_reason":"Salty depth"}],"instructions":["Bake"]}"#,
    )
    .await;

    let mut request = FreeFormRequest::new("brownies");
    request.include_wildcard = true;
    let draft = orchestrator(&server, "test-key").generate(request).await.unwrap();

    assert_eq!(draft.source, RecipeSource::WildcardModified);
    assert!(draft.ingredients[0].is_wildcard);
    assert_eq!(draft.ingredients[0].wildcard_reason.as_deref(), Some("Salty depth"));
}

#[tokio::test]
async fn test_malformed_json_fails_extraction() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(&mut server, "{not valid json").await;

    let orch = orchestrator(&server, "test-key");
    let mut run = IngestionRun::new("free_form");
    let result = orch
        .execute(
            &GenerationRequest::FreeForm(FreeFormRequest::new("soup")),
            &mut run,
        )
        .await;

    assert!(matches!(result, Err(IngestError::MalformedJson(_))));
    assert_eq!(run.state(), PipelineState::Failed);
    assert!(run.history().contains(&PipelineState::Extracting));
    assert!(!run.history().contains(&PipelineState::Normalizing));
}

#[tokio::test]
async fn test_reply_without_braces_has_no_json() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(&mut server, "Sorry, I can't help with that.").await;

    let result = orchestrator(&server, "test-key")
        .generate(FreeFormRequest::new("soup"))
        .await;
    assert!(matches!(result, Err(IngestError::NoJsonFound)));
}

#[tokio::test]
async fn test_empty_credential_fails_before_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let orch = orchestrator(&server, "");
    let mut run = IngestionRun::new("free_form");
    let result = orch
        .execute(
            &GenerationRequest::FreeForm(FreeFormRequest::new("soup")),
            &mut run,
        )
        .await;

    assert!(matches!(result, Err(IngestError::Configuration(_))));
    assert_eq!(run.state(), PipelineState::Failed);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_quota_error_reaches_caller() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = orchestrator(&server, "test-key")
        .generate(FreeFormRequest::new("soup"))
        .await
        .unwrap_err();
    match err {
        IngestError::Provider { kind, .. } => assert_eq!(kind, ProviderErrorKind::QuotaExceeded),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_augment_only_adds_ingredients() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(
        &mut server,
        r#"{"wildcard_ingredients":[{"name":"Anchovy","quantity":"2","unit":"fillets","reason":"Savory backbone"}],"description":"Pasta with a salty twist"}"#,
    )
    .await;

    let existing = dinner();
    let augmented = orchestrator(&server, "test-key")
        .augment(&existing)
        .await
        .unwrap();

    assert_eq!(augmented.source, RecipeSource::WildcardModified);
    assert_eq!(augmented.ingredients.len(), existing.ingredients.len() + 1);
    assert_eq!(
        &augmented.ingredients[..existing.ingredients.len()],
        &existing.ingredients[..]
    );
    let added = &augmented.ingredients[3];
    assert!(added.is_wildcard);
    assert_eq!(added.order_index, 3);
    assert_eq!(added.wildcard_reason.as_deref(), Some("Savory backbone"));
    // no updated_instructions means the steps are untouched
    assert_eq!(augmented.instructions, existing.instructions);
    assert_eq!(augmented.description, "Pasta with a salty twist");
}

#[tokio::test]
async fn test_augment_replaces_instructions_when_given() {
    let mut server = Server::new_async().await;
    let _mock = mock_model(
        &mut server,
        r#"{"wildcard_ingredients":[],"updated_instructions":[{"step_number":1,"content":"Boil"},{"step_number":2,"content":"Mash anchovy into oil"}]}"#,
    )
    .await;

    let existing = dinner();
    let augmented = orchestrator(&server, "test-key")
        .augment(&existing)
        .await
        .unwrap();

    assert_eq!(augmented.ingredients, existing.ingredients);
    assert_eq!(augmented.instructions.len(), 2);
    assert_eq!(augmented.instructions[1].content, "Mash anchovy into oil");
    assert_eq!(augmented.title, existing.title);
}

#[tokio::test]
async fn test_import_text_rejects_short_input_without_calling_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = orchestrator(&server, "test-key")
        .import_text("   eggs   ")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidInput(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_import_url_fetches_page_and_keeps_source() {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/pancakes")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(format!(
            "<html><head><script>var tracking = 1;</script></head><body><h1>Pancakes</h1><p>{}</p></body></html>",
            PANCAKE_PAGE_TEXT
        ))
        .create_async()
        .await;
    let model = server
        .mock("POST", GEMINI_PATH)
        .match_body(Matcher::Regex("Fluffy pancakes".to_string()))
        .with_status(200)
        .with_body(gemini_body(
            r#"{"title":"Pancakes","ingredients":[{"name":"Flour","quantity":"2","unit":"cups"}],"instructions":["Whisk","Fry"]}"#,
        ))
        .create_async()
        .await;

    let url = format!("{}/pancakes", server.url());
    let draft = orchestrator(&server, "test-key")
        .import_url(&url)
        .await
        .unwrap();

    assert_eq!(draft.title, "Pancakes");
    assert_eq!(draft.source, RecipeSource::Imported);
    assert_eq!(draft.source_url.as_deref(), Some(url.as_str()));
    page.assert_async().await;
    model.assert_async().await;
}

#[tokio::test]
async fn test_import_url_reports_blocked_page() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/blocked")
        .with_status(403)
        .create_async()
        .await;
    let model = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = orchestrator(&server, "test-key")
        .import_url(&format!("{}/blocked", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Acquisition(_)));
    model.assert_async().await;
}
