use mockito::{Matcher, Server};
use recipe_wildcard::wildcard::suggest_wildcard;
use recipe_wildcard::{
    AiConfig, Difficulty, FreeFormRequest, IngestError, Intensity, Provider, RecipeSource,
    RecipeWildcard,
};
use serde_json::json;
use std::time::Duration;

fn chat_body(reply: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": reply}}]}).to_string()
}

/// Use Case 1: builder pointed at a local OpenAI-compatible server
#[tokio::test]
async fn test_builder_generate_through_ollama() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "qwen2.5"})))
        .with_status(200)
        .with_body(chat_body(
            r#"{"title":"Mushroom Risotto","difficulty":"Medium","servings":"4 people","ingredients":[{"name":"Arborio rice","quantity":1.5,"unit":"cups"}],"instructions":["Toast the rice","Add stock slowly"]}"#,
        ))
        .create_async()
        .await;

    let orchestrator = RecipeWildcard::builder()
        .config(AiConfig::default())
        .provider(Provider::Ollama)
        .model("qwen2.5")
        .base_url(server.url())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let mut request = FreeFormRequest::new("a creamy risotto");
    request.difficulty = Some(Difficulty::Medium);
    let draft = orchestrator.generate(request).await.unwrap();

    assert_eq!(draft.title, "Mushroom Risotto");
    assert_eq!(draft.source, RecipeSource::AiGenerated);
    assert_eq!(draft.difficulty, Some(Difficulty::Medium));
    assert_eq!(draft.servings, Some(4));
    assert_eq!(draft.ingredients[0].quantity, "1.5");
    assert_eq!(draft.instructions.len(), 2);
    mock.assert_async().await;
}

/// Use Case 2: explicit key sent as a bearer token
#[tokio::test]
async fn test_builder_openai_uses_explicit_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_body(chat_body(r#"{"title":"Toast"}"#))
        .create_async()
        .await;

    let orchestrator = RecipeWildcard::builder()
        .config(AiConfig::default())
        .provider(Provider::OpenAI)
        .api_key("sk-test")
        .base_url(server.url())
        .build()
        .unwrap();

    let draft = orchestrator.generate(FreeFormRequest::new("toast")).await.unwrap();
    assert_eq!(draft.title, "Toast");
    mock.assert_async().await;
}

/// Use Case 3: empty prompt never reaches the provider
#[tokio::test]
async fn test_builder_rejects_empty_prompt() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let orchestrator = RecipeWildcard::builder()
        .config(AiConfig::default())
        .provider(Provider::Ollama)
        .base_url(server.url())
        .build()
        .unwrap();

    let err = orchestrator.generate(FreeFormRequest::new("   ")).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidInput(_)));
    mock.assert_async().await;
}

/// Use Case 4: configured import threshold applies to pasted text
#[tokio::test]
async fn test_builder_min_import_chars() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(chat_body(r#"{"title":"Eggs","ingredients":["2 eggs"],"instructions":["Scramble"]}"#))
        .create_async()
        .await;

    let orchestrator = RecipeWildcard::builder()
        .config(AiConfig::default())
        .provider(Provider::Ollama)
        .base_url(server.url())
        .min_import_chars(5)
        .build()
        .unwrap();

    let draft = orchestrator.import_text("Scrambled eggs").await.unwrap();
    assert_eq!(draft.source, RecipeSource::Imported);
    assert_eq!(draft.ingredients[0].name, "2 eggs");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_suggest_wildcard_through_builder() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(chat_body(
            r#"{"ingredient":{"name":"Sumac","category":"Acidic Notes","flavor_profile":["tart"],"intensity":"subtle"},"reason":"Brightens the lamb","how_to_use":"Sprinkle before serving","quantity_suggestion":"1 tsp"}"#,
        ))
        .create_async()
        .await;

    let orchestrator = RecipeWildcard::builder()
        .config(AiConfig::default())
        .provider(Provider::Ollama)
        .base_url(server.url())
        .build()
        .unwrap();

    let suggestion = suggest_wildcard(
        &orchestrator,
        &["lamb".to_string(), "yogurt".to_string()],
        Some("Turkish"),
    )
    .await
    .unwrap();

    assert_eq!(suggestion.ingredient.name, "Sumac");
    assert_eq!(suggestion.ingredient.intensity, Intensity::Subtle);
    let ingredient = suggestion.into_ingredient();
    assert!(ingredient.is_wildcard);
    assert_eq!(ingredient.quantity, "1 tsp");
}
