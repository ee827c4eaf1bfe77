//! Checkout start and completion handlers

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::services::CompletedPurchase;

/// Response for a freshly created checkout session
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Query for the checkout redirect target
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// POST /checkout
pub async fn create_checkout(
    State(state): State<AppState>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let session = state.purchase_service.start_checkout().await?;

    info!(session_id = %session.id, "Checkout session created");

    Ok(Json(CheckoutResponse {
        id: session.id,
        url: session.url,
    }))
}

/// GET /success?session_id=
///
/// Issues the key and shows it. This page is the only place the plaintext
/// ever appears.
pub async fn checkout_success(
    State(state): State<AppState>,
    Query(query): Query<SuccessQuery>,
) -> Result<Html<String>, ApiError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("session_id is required").with_code("missing_session_id"))?;

    let purchase = state.purchase_service.complete_checkout(&session_id).await?;

    Ok(Html(render_confirmation(&purchase)))
}

fn render_confirmation(purchase: &CompletedPurchase) -> String {
    let name = purchase
        .customer
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("there");

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Subscription active</title></head>
<body style="font-family: sans-serif; max-width: 40rem; margin: 3rem auto">
<h1>Thanks for your order, {name}!</h1>
<h3>Your API key is:</h3>
<pre>{key}</pre>
<p>Store it somewhere safe. It will not be shown again.</p>
</body>
</html>
"#,
        name = escape_html(name),
        key = escape_html(&purchase.key.plaintext),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, AccountId};
    use crate::domain::api_key::IssuedKey;
    use crate::domain::billing::Customer;
    use crate::infrastructure::api_key::KeyHasher;

    fn purchase(name: Option<&str>) -> CompletedPurchase {
        let plaintext = "0123456789abcdef0123456789abcdef".to_string();
        let fingerprint = KeyHasher::new().hash(&plaintext).unwrap();

        CompletedPurchase {
            account: Account::new(AccountId::new("cus_1").unwrap(), fingerprint.clone()),
            customer: Customer {
                id: "cus_1".to_string(),
                name: name.map(str::to_string),
                email: None,
            },
            key: IssuedKey {
                plaintext,
                fingerprint,
            },
        }
    }

    #[test]
    fn test_confirmation_shows_key_and_name() {
        let page = render_confirmation(&purchase(Some("Ada")));

        assert!(page.contains("Thanks for your order, Ada!"));
        assert!(page.contains("<pre>0123456789abcdef0123456789abcdef</pre>"));
    }

    #[test]
    fn test_confirmation_escapes_customer_name() {
        let page = render_confirmation(&purchase(Some("<script>alert(1)</script>")));

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_confirmation_without_name() {
        let page = render_confirmation(&purchase(None));
        assert!(page.contains("Thanks for your order, there!"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
