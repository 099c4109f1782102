//! Customer route handlers.
//!
//! These work on the scalar customer fields only; addresses are carried
//! through untouched. See [`super::with_addresses`] for the variants that
//! embed addresses.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use univali_core::{Cpf, CustomerId};

use crate::{
    db::RepositoryError,
    error::{AppError, Result},
    extract::{AppJson, AppPath},
    models::{Customer, CustomerFields, NewCustomer, PatchDocument},
    state::AppState,
};

/// Customer as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: CustomerId,
    pub name: String,
    pub cpf: String,
}

/// Body of `POST /api/customers`.
///
/// Fields are optional so that missing values are reported as validation
/// errors rather than as malformed JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForCreation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
}

/// Body of `PUT /api/customers/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForUpdate {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.as_str().to_owned(),
            cpf: customer.cpf.as_str().to_owned(),
        }
    }
}

/// Reject a body whose `id` does not match the path.
pub(super) fn ensure_ids_match(path_id: CustomerId, body_id: Option<CustomerId>) -> Result<()> {
    if body_id == Some(path_id) {
        Ok(())
    } else {
        let body_id = body_id.map_or_else(|| "missing".to_string(), |id| id.to_string());
        Err(AppError::BadRequest(format!(
            "path id {path_id} does not match body id {body_id}"
        )))
    }
}

fn not_found(id: CustomerId) -> AppError {
    AppError::NotFound(format!("customer {id}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/customers`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CustomerDto>>> {
    let customers = state.customers().list_customers().await?;
    Ok(Json(customers.iter().map(CustomerDto::from).collect()))
}

/// `GET /api/customers/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<CustomerId>,
) -> Result<Json<CustomerDto>> {
    let customer = state
        .customers()
        .find_customer_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(CustomerDto::from(&customer)))
}

/// `GET /api/customers/cpf/{cpf}`
#[instrument(skip(state, cpf))]
pub async fn show_by_cpf(
    State(state): State<AppState>,
    AppPath(cpf): AppPath<String>,
) -> Result<Json<CustomerDto>> {
    let missing = || AppError::NotFound(format!("customer with cpf {cpf}"));

    // A malformed cpf cannot belong to any stored customer.
    let parsed = Cpf::parse(&cpf).map_err(|_| missing())?;
    let customer = state
        .customers()
        .find_customer_by_national_id(&parsed)
        .await?
        .ok_or_else(missing)?;

    Ok(Json(CustomerDto::from(&customer)))
}

/// `POST /api/customers`
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson<CustomerForCreation>,
) -> Result<impl IntoResponse> {
    let fields = CustomerFields::validate(body.name.as_deref(), body.cpf.as_deref())?;

    let customer = state
        .customers()
        .add_customer(NewCustomer {
            fields,
            addresses: Vec::new(),
        })
        .await?;

    tracing::info!(customer_id = %customer.id, "Customer created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/customers/{}", customer.id))],
        Json(CustomerDto::from(&customer)),
    ))
}

/// `PUT /api/customers/{id}`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<CustomerId>,
    AppJson(body): AppJson<CustomerForUpdate>,
) -> Result<StatusCode> {
    ensure_ids_match(id, body.id)?;
    let fields = CustomerFields::validate(body.name.as_deref(), body.cpf.as_deref())?;

    state
        .customers()
        .update_customer_fields(id, fields)
        .await
        .map_err(|e| map_not_found(e, id))?;

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/customers/{id}`
///
/// The id comes from the path only; the document cannot change it. The
/// body is read raw so that a missing customer is reported (404) before the
/// document is parsed. Any document that does not parse, including unknown
/// ops, unsupported paths and a missing `value`, is a 400.
#[instrument(skip(state, body))]
pub async fn patch(
    State(state): State<AppState>,
    AppPath(id): AppPath<CustomerId>,
    body: Bytes,
) -> Result<StatusCode> {
    if state.customers().find_customer_by_id(id).await?.is_none() {
        return Err(not_found(id));
    }

    let Json(patch) = Json::<PatchDocument>::from_bytes(&body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    state
        .customers()
        .patch_customer(id, &patch)
        .await
        .map_err(|e| map_not_found(e, id))?;

    tracing::info!(customer_id = %id, operations = patch.operations().len(), "Customer patched");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/customers/{id}`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<CustomerId>,
) -> Result<StatusCode> {
    state
        .customers()
        .remove_customer(id)
        .await
        .map_err(|e| map_not_found(e, id))?;

    tracing::info!(customer_id = %id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Name the missing customer in the 404 body.
pub(super) fn map_not_found(err: RepositoryError, id: CustomerId) -> AppError {
    match err {
        RepositoryError::NotFound => not_found(id),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use super::*;
    use crate::routes::test_support::{TestApp, customer};

    #[tokio::test]
    async fn test_scenario_create_delete_list() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let (status, headers, body) = app
            .send(Method::POST, "/api/customers", Some(json!({ "name": "Bob", "cpf": "222" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/api/customers/2");
        assert_eq!(body, json!({ "id": 2, "name": "Bob", "cpf": "222" }));

        let (status, _, _) = app.send(Method::DELETE, "/api/customers/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _, _) = app.send(Method::GET, "/api/customers/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = app.send(Method::GET, "/api/customers", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "id": 2, "name": "Bob", "cpf": "222" }]));
    }

    #[tokio::test]
    async fn test_show_and_show_by_cpf() {
        let app = TestApp::with_customers(vec![
            customer(1, "Ana", "111", &[]),
            customer(2, "Bob", "222", &[]),
        ]);

        let (status, _, body) = app.send(Method::GET, "/api/customers/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Bob");

        let (status, _, body) = app.send(Method::GET, "/api/customers/cpf/111", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);

        let (status, _, body) = app.send(Method::GET, "/api/customers/cpf/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "customer with cpf 999");

        let (status, _, _) = app.send(Method::GET, "/api/customers/cpf/not-a-cpf", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_show_rejects_non_integer_id() {
        let app = TestApp::with_customers(vec![]);

        let (status, headers, body) = app.send(Method::GET, "/api/customers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_create_on_empty_store_starts_at_one() {
        let app = TestApp::with_customers(vec![]);

        let (status, _, body) = app
            .send(Method::POST, "/api/customers", Some(json!({ "name": "Ana", "cpf": "111" })))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_create_validation_problem() {
        let app = TestApp::with_customers(vec![]);

        let (status, headers, body) = app
            .send(Method::POST, "/api/customers", Some(json!({ "cpf": "12.3" })))
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        assert_eq!(body["status"], 422);
        assert_eq!(body["errors"]["name"][0], "The name field is required.");
        assert_eq!(
            body["errors"]["cpf"][0],
            "The cpf field must contain only digits."
        );

        let (_, _, body) = app.send(Method::GET, "/api/customers", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let app = TestApp::with_customers(vec![]);

        let (status, _, body) = app
            .send_raw(Method::POST, "/api/customers", "{ not json")
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_update() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let (status, _, _) = app
            .send(
                Method::PUT,
                "/api/customers/1",
                Some(json!({ "id": 1, "name": "Ana Maria", "cpf": "112" })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, _, body) = app.send(Method::GET, "/api/customers/1", None).await;
        assert_eq!(body, json!({ "id": 1, "name": "Ana Maria", "cpf": "112" }));
    }

    #[tokio::test]
    async fn test_update_id_mismatch_is_bad_request() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let (status, _, body) = app
            .send(
                Method::PUT,
                "/api/customers/1",
                Some(json!({ "id": 2, "name": "Ana", "cpf": "111" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "path id 1 does not match body id 2");

        let (status, _, _) = app
            .send(
                Method::PUT,
                "/api/customers/1",
                Some(json!({ "name": "Ana", "cpf": "111" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let app = TestApp::with_customers(vec![]);

        let (status, _, body) = app
            .send(
                Method::PUT,
                "/api/customers/7",
                Some(json!({ "id": 7, "name": "Ana", "cpf": "111" })),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "customer 7");
    }

    #[tokio::test]
    async fn test_update_invalid_fields() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let (status, _, body) = app
            .send(
                Method::PUT,
                "/api/customers/1",
                Some(json!({ "id": 1, "name": "", "cpf": "111" })),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_patch() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let (status, _, _) = app
            .send(
                Method::PATCH,
                "/api/customers/1",
                Some(json!([{ "op": "replace", "path": "/name", "value": "Ana Clara" }])),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, _, body) = app.send(Method::GET, "/api/customers/1", None).await;
        assert_eq!(body["name"], "Ana Clara");
        assert_eq!(body["cpf"], "111");
    }

    #[tokio::test]
    async fn test_patch_failures() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let replace = json!([{ "op": "replace", "path": "/name", "value": "X" }]);
        let (status, _, _) = app
            .send(Method::PATCH, "/api/customers/9", Some(replace))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let failing_test = json!([
            { "op": "replace", "path": "/name", "value": "X" },
            { "op": "test", "path": "/cpf", "value": "000" },
        ]);
        let (status, _, _) = app
            .send(Method::PATCH, "/api/customers/1", Some(failing_test))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let remove = json!([{ "op": "remove", "path": "/cpf" }]);
        let (status, _, body) = app
            .send(Method::PATCH, "/api/customers/1", Some(remove))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["cpf"][0], "The cpf field is required.");

        let bad_path = json!([{ "op": "replace", "path": "/id", "value": "5" }]);
        let (status, _, body) = app
            .send(Method::PATCH, "/api/customers/1", Some(bad_path))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (_, _, body): (_, _, Value) = app.send(Method::GET, "/api/customers/1", None).await;
        assert_eq!(body, json!({ "id": 1, "name": "Ana", "cpf": "111" }));
    }

    #[tokio::test]
    async fn test_malformed_patch_documents_are_bad_requests() {
        let app = TestApp::with_customers(vec![customer(1, "Ana", "111", &[])]);

        let documents = [
            json!([{ "op": "replace", "path": "/name" }]),
            json!([{ "op": "increment", "path": "/name", "value": "X" }]),
            json!([{ "op": "copy", "path": "/name" }]),
            json!({ "op": "replace", "path": "/name", "value": "X" }),
        ];
        for document in documents {
            let (status, _, body) = app
                .send(Method::PATCH, "/api/customers/1", Some(document.clone()))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "document: {document}");
            assert_eq!(body["status"], 400);
        }

        let (status, _, _) = app
            .send_raw(Method::PATCH, "/api/customers/1", "[{ not json")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, _, body) = app.send(Method::GET, "/api/customers/1", None).await;
        assert_eq!(body, json!({ "id": 1, "name": "Ana", "cpf": "111" }));
    }

    #[tokio::test]
    async fn test_patch_missing_customer_is_checked_before_document() {
        let app = TestApp::with_customers(vec![]);

        let (status, _, body) = app
            .send(
                Method::PATCH,
                "/api/customers/9",
                Some(json!([{ "op": "increment", "path": "/name" }])),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "customer 9");
    }

    /// Records `(span name, ["field=value", ..])` for every new span.
    #[derive(Clone, Default)]
    struct SpanRecorder {
        spans: std::sync::Arc<std::sync::Mutex<Vec<(String, Vec<String>)>>>,
    }

    struct FieldVisitor(Vec<String>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push(format!("{}={value:?}", field.name()));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanRecorder {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            attrs.record(&mut visitor);
            self.spans
                .lock()
                .unwrap()
                .push((attrs.metadata().name().to_string(), visitor.0));
        }
    }

    #[tokio::test]
    async fn test_show_by_cpf_span_omits_national_id() {
        use tracing_subscriber::layer::SubscriberExt;

        let recorder = SpanRecorder::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorder.clone()),
        );
        let app = TestApp::with_customers(vec![customer(1, "Ana", "73473943096", &[])]);

        let (status, _, _) = app
            .send(Method::GET, "/api/customers/cpf/73473943096", None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let spans = recorder.spans.lock().unwrap();
        let (_, fields) = spans
            .iter()
            .find(|(name, _)| name == "show_by_cpf")
            .unwrap();
        assert!(fields.iter().all(|f| !f.contains("73473943096")), "{fields:?}");
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let app = TestApp::with_customers(vec![]);

        let (status, _, _) = app.send(Method::DELETE, "/api/customers/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_ensure_ids_match() {
        assert!(ensure_ids_match(CustomerId::new(1), Some(CustomerId::new(1))).is_ok());
        assert!(matches!(
            ensure_ids_match(CustomerId::new(1), None),
            Err(AppError::BadRequest(_))
        ));
    }
}
