//! Handlers for the greeting resource.
//!
//! Each handler is a plain async function over already-validated input. The
//! same functions back both the HTTP routes and the in-process server
//! actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};
use vergestack_core::{typed, validated, Action};

use crate::builder::create_action;

/// Languages the greeter knows, with their salutation.
const SALUTATIONS: [(&str, &str); 3] = [("en", "Hello"), ("fr", "Bonjour"), ("es", "Hola")];

/// Request body for `/greet`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GreetInput {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub name: String,
    #[serde(default = "default_language")]
    #[validate(custom(function = "supported_language"))]
    pub language: String,
}

/// Response body for `/greet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Greeting {
    #[validate(length(min = 1))]
    pub message: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn supported_language(language: &str) -> Result<(), ValidationError> {
    if SALUTATIONS.iter().any(|(code, _)| *code == language) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_language")
            .with_message("Language must be one of: en, fr, es".into()))
    }
}

/// POST /api/v1/hello
pub async fn hello(name: String) -> anyhow::Result<String> {
    Ok(format!("Hello, {name}!"))
}

/// POST /api/v1/greet
pub async fn greet(input: GreetInput) -> anyhow::Result<Greeting> {
    let salutation = SALUTATIONS
        .iter()
        .find(|(code, _)| *code == input.language)
        .map(|(_, salutation)| *salutation)
        .ok_or_else(|| anyhow::anyhow!("no salutation for language {}", input.language))?;

    Ok(Greeting {
        message: format!("{salutation}, {}!", input.name),
    })
}

/// POST /api/v1/echo
pub async fn echo(value: Value) -> anyhow::Result<Value> {
    Ok(value)
}

/// POST /api/v1/fail
///
/// Always fails; the cause is logged and the client sees the generic
/// server-error envelope.
pub async fn fail(name: String) -> anyhow::Result<String> {
    anyhow::bail!("greeting backend unavailable for {name}")
}

/// [`hello`] as an in-process server action.
pub fn hello_action() -> impl Action<Input = String, Output = String> + Clone {
    create_action()
        .input(typed::<String>())
        .output(typed::<String>())
        .handler(hello)
}

/// [`greet`] as an in-process server action.
pub fn greet_action() -> impl Action<Input = GreetInput, Output = Greeting> + Clone {
    create_action()
        .input(validated::<GreetInput>())
        .output(validated::<Greeting>())
        .handler(greet)
}

/// [`fail`] as an in-process server action.
pub fn fail_action() -> impl Action<Input = String, Output = Value> + Clone {
    create_action().input(typed::<String>()).handler(fail)
}

#[cfg(test)]
mod tests {
    use vergestack_core::{ApiResponse, FieldError};

    use super::*;

    #[tokio::test]
    async fn greet_uses_language_salutation() {
        let greeting = greet(GreetInput {
            name: "monde".into(),
            language: "fr".into(),
        })
        .await
        .unwrap();
        assert_eq!(greeting.message, "Bonjour, monde!");
    }

    #[test]
    fn unsupported_language_fails_validation() {
        let input = GreetInput {
            name: "world".into(),
            language: "de".into(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn hello_action_greets() {
        let response = hello_action().call("world".into()).await;
        assert_eq!(response, ApiResponse::success("Hello, world!".to_string()));
    }

    #[tokio::test]
    async fn greet_action_reports_both_fields() {
        let response = greet_action()
            .call(GreetInput {
                name: String::new(),
                language: "xx".into(),
            })
            .await;

        assert_eq!(
            response,
            ApiResponse::error(vec![
                FieldError::new("language", "Language must be one of: en, fr, es"),
                FieldError::new("name", "Name must be between 1 and 64 characters"),
            ])
        );
    }

    #[tokio::test]
    async fn fail_action_returns_generic_error() {
        let response = fail_action().call("world".into()).await;
        assert_eq!(response, ApiResponse::internal_error());
    }
}
