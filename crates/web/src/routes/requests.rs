//! Customer request list, create and delete handlers.
//!
//! The list page is fully server-rendered from one store read. Mutations
//! redirect back to it (keeping the active filters), so the page always
//! reflects the store after the write.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use classic_matcher_core::matching::{self, decompose_all, filter_and_sort, matched_requests};
use classic_matcher_core::{
    CustomerRequest, FilterCriteria, NewCustomerRequest, RequestId, SortKey,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::Flash;
use crate::models::session::{set_flash, set_form_draft, take_flash, take_form_draft};
use crate::state::AppState;
use crate::store::StoreError;

/// Query parameters for the list page.
///
/// Every field is optional so a bare `/` and hand-edited URLs both work;
/// an unknown sort key falls back to store order.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Convert to filter criteria.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        let sort = self
            .sort
            .as_deref()
            .map(|s| {
                s.parse::<SortKey>().unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Ignoring sort parameter");
                    SortKey::None
                })
            })
            .unwrap_or_default();

        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            make: self.make.clone().unwrap_or_default(),
            model: self.model.clone().unwrap_or_default(),
            sort,
        }
    }
}

/// Encode criteria as a query string, omitting unset fields.
#[must_use]
pub fn query_string(criteria: &FilterCriteria) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let pairs = [
        ("search", criteria.search.as_str()),
        ("make", criteria.make.as_str()),
        ("model", criteria.model.as_str()),
        ("sort", criteria.sort.as_str()),
    ];
    for (key, value) in pairs {
        if !value.is_empty() {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// List page URL for the given criteria.
fn list_url(criteria: &FilterCriteria) -> String {
    let query = query_string(criteria);
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

/// Customer request view for templates.
#[derive(Debug, Clone)]
pub struct RequestView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub vehicle_request: String,
    pub created_at: String,
}

impl From<&CustomerRequest> for RequestView {
    fn from(request: &CustomerRequest) -> Self {
        Self {
            id: request.id.to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            vehicle_request: request.vehicle_request.clone(),
            created_at: request.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Select option view for templates.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    fn facet(value: &str, selected: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
            selected: value == selected,
        }
    }
}

fn sort_options(active: SortKey) -> Vec<OptionView> {
    [
        (SortKey::Make, "Make (A-Z)"),
        (SortKey::Model, "Model (A-Z)"),
    ]
    .into_iter()
    .map(|(key, label)| OptionView {
        value: key.as_str().to_string(),
        label: label.to_string(),
        selected: key == active,
    })
    .collect()
}

/// List page template.
#[derive(Template, WebTemplate)]
#[template(path = "requests/index.html")]
pub struct IndexTemplate {
    pub nonce: String,
    pub notices: Vec<Flash>,
    pub draft: NewCustomerRequest,
    pub criteria: FilterCriteria,
    /// Query string to carry the current filters through form posts.
    pub return_query: String,
    pub clear_href: String,
    pub makes: Vec<OptionView>,
    pub models: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub requests: Vec<RequestView>,
    pub matches: Vec<RequestView>,
}

impl IndexTemplate {
    /// Whether the model filter can be used.
    #[must_use]
    pub fn model_enabled(&self) -> bool {
        !self.criteria.make.is_empty()
    }
}

/// List page handler.
///
/// GET /
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Query(query): Query<ListQuery>,
) -> Result<IndexTemplate> {
    let mut notices: Vec<Flash> = take_flash(&session).await?.into_iter().collect();
    let draft = take_form_draft(&session).await?.unwrap_or_default();

    // A failed read keeps showing the last list the store returned.
    let records = match state.store().list().await {
        Ok(records) => state.remember_records(records),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load customer requests");
            notices.push(Flash::error("Error loading customers"));
            state.last_records()
        }
    };

    let decomposed = decompose_all(&records);
    let criteria = query.criteria();
    let facets = matching::facets(&decomposed, &criteria.make);
    let criteria = criteria.normalized(&facets);
    let view = filter_and_sort(&decomposed, &criteria);

    // Matching is skipped entirely while there are no records.
    let matches = if decomposed.is_empty() {
        Vec::new()
    } else {
        let inventory = state.inventory().current().await;
        matched_requests(&decomposed, &inventory)
            .into_iter()
            .map(RequestView::from)
            .collect()
    };

    tracing::debug!(
        total = records.len(),
        shown = view.len(),
        matched = matches.len(),
        "Rendering request list"
    );

    Ok(IndexTemplate {
        nonce: nonce.0,
        notices,
        draft,
        return_query: query_string(&criteria),
        clear_href: list_url(&criteria.cleared()),
        makes: facets
            .makes
            .iter()
            .map(|m| OptionView::facet(m, &criteria.make))
            .collect(),
        models: facets
            .models
            .iter()
            .map(|m| OptionView::facet(m, &criteria.model))
            .collect(),
        sorts: sort_options(criteria.sort),
        requests: view.iter().map(|r| RequestView::from(r.request)).collect(),
        matches,
        criteria,
    })
}

/// Create a customer request.
///
/// POST /requests
///
/// Invalid input never reaches the store. On any failure the submitted
/// values are kept for the next render.
#[instrument(skip(state, session, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
    Form(form): Form<NewCustomerRequest>,
) -> Result<Redirect> {
    let back = Redirect::to(&list_url(&query.criteria()));

    let request = match form.clone().validated() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(error = %e, "Rejected customer request");
            set_flash(&session, Flash::error(format!("Failed to add customer: {e}"))).await?;
            set_form_draft(&session, &form).await?;
            return Ok(back);
        }
    };

    match state.store().insert(&request).await {
        Ok(created) => {
            tracing::info!(id = %created.id, "Customer request added");
            add_breadcrumb("requests", "Added customer request", Some(&[("id", created.id.as_str())]));
            set_flash(&session, Flash::success("Customer added")).await?;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add customer request");
            set_flash(&session, Flash::error("Failed to add customer")).await?;
            set_form_draft(&session, &request).await?;
        }
    }

    Ok(back)
}

/// Delete a customer request.
///
/// POST /requests/{id}/delete
///
/// The browser asks for confirmation before submitting.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect> {
    let id = RequestId::new(id);

    let flash = match state.store().delete(&id).await {
        Ok(()) => {
            tracing::info!(id = %id, "Customer request deleted");
            add_breadcrumb("requests", "Deleted customer request", Some(&[("id", id.as_str())]));
            Flash::success("Deleted successfully")
        }
        Err(StoreError::NotFound(_)) => {
            tracing::warn!(id = %id, "Delete of unknown customer request");
            Flash::error("Failed to delete: request no longer exists")
        }
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to delete customer request");
            Flash::error("Failed to delete")
        }
    };
    set_flash(&session, flash).await?;

    Ok(Redirect::to(&list_url(&query.criteria())))
}
