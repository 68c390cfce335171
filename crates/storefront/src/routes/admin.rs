//! Back-office route handlers.
//!
//! Every handler takes [`RequireAdmin`] first, so a refused request is
//! redirected before its form body is read.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use lustre_core::{ItemDraft, ItemFields, ItemId, Selection};

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, Visitor};
use crate::models::FlashLevel;
use crate::services::uploads::{self, UploadError};
use crate::state::AppState;
use crate::views::{ItemView, PageContext};

const ITEM_NOT_FOUND: &str = "Item not found";
const UPLOAD_TOO_LARGE: &str = "Upload must be at most 16 MB";

/// Item list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub page: PageContext,
    pub items: Vec<ItemView>,
}

/// Add/edit item form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/item_form.html")]
pub struct ItemFormTemplate {
    pub page: PageContext,
    pub heading: &'static str,
    pub action: String,
    pub draft: ItemDraft,
    pub error: Option<String>,
}

/// An image file attached to the item form.
struct ImageUpload {
    file_name: String,
    bytes: Bytes,
}

/// The decoded multipart item form.
struct ItemSubmission {
    draft: ItemDraft,
    image: Option<ImageUpload>,
    /// The body went over the size limit; `draft` holds the fields read
    /// before it and `image` is empty.
    too_large: bool,
}

/// Read the multipart item form. An empty `image` field means no upload.
///
/// A body over the size limit is not an error here: it comes back as a
/// submission flagged `too_large` so the form can be shown again.
async fn read_submission(multipart: &mut Multipart) -> Result<ItemSubmission> {
    let mut pairs = Vec::new();
    let mut image = None;

    let too_large = match read_fields(multipart, &mut pairs, &mut image).await {
        Ok(()) => false,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => true,
        Err(e) => return Err(e.into()),
    };

    Ok(ItemSubmission {
        draft: ItemDraft::from_fields(pairs),
        image: image.filter(|_| !too_large),
        too_large,
    })
}

async fn read_fields(
    multipart: &mut Multipart,
    pairs: &mut Vec<(String, String)>,
    image: &mut Option<ImageUpload>,
) -> std::result::Result<(), MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            *image = read_image(field).await?;
        } else {
            pairs.push((name, field.text().await?));
        }
    }
    Ok(())
}

async fn read_image(field: Field<'_>) -> std::result::Result<Option<ImageUpload>, MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let bytes = field.bytes().await?;
    Ok((!file_name.is_empty() && !bytes.is_empty()).then_some(ImageUpload { file_name, bytes }))
}

/// Validate a submission and store its image.
///
/// `Ok(Err(message))` is a rejection to show on the form.
async fn accept_submission(
    state: &AppState,
    submission: &ItemSubmission,
) -> Result<std::result::Result<ItemFields, String>> {
    if submission.too_large {
        return Ok(Err(UPLOAD_TOO_LARGE.to_owned()));
    }

    let mut fields = match submission.draft.validate() {
        Ok(fields) => fields,
        Err(e) => return Ok(Err(e.to_string())),
    };

    // Stored only once the rest of the form is valid.
    if let Some(image) = &submission.image {
        match uploads::save_image(&state.config().images_dir(), &image.file_name, &image.bytes).await {
            Ok(url) => fields.image_url = Some(url),
            Err(e @ UploadError::UnsupportedType) => return Ok(Err(e.to_string())),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Ok(fields))
}

/// Re-render the form with the submitted values and a message (HTTP 422).
async fn reject_form(
    visitor: &Visitor,
    heading: &'static str,
    action: String,
    draft: ItemDraft,
    error: String,
) -> Result<Response> {
    tracing::info!(%error, "Item form rejected");
    let template = ItemFormTemplate {
        page: PageContext::load(visitor).await?,
        heading,
        action,
        draft,
        error: Some(error),
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}

/// Delete an uploaded image no item refers to any more.
async fn discard_image(state: &AppState, url: &str) {
    if let Err(e) = uploads::remove_image(&state.config().images_dir(), url).await {
        tracing::warn!(%url, error = %e, "Failed to remove item image");
    }
}

async fn not_found(visitor: &Visitor) -> Result<Redirect> {
    visitor.flash(FlashLevel::Danger, ITEM_NOT_FOUND).await?;
    Ok(Redirect::to("/admin"))
}

// =============================================================================
// Handlers
// =============================================================================

/// List every item.
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<impl IntoResponse> {
    let items = CatalogRepository::new(state.pool()).list_all().await?;
    let none = Selection::new();

    Ok(AdminIndexTemplate {
        page: PageContext::load(&visitor).await?,
        items: ItemView::list(&items, &none, &none),
    })
}

/// Display the empty item form.
pub async fn new_item(
    RequireAdmin(_admin): RequireAdmin,
    visitor: Visitor,
) -> Result<impl IntoResponse> {
    Ok(ItemFormTemplate {
        page: PageContext::load(&visitor).await?,
        heading: "Add Jewelry Item",
        action: "/admin/add".to_owned(),
        draft: ItemDraft::default(),
        error: None,
    })
}

/// Create an item from the submitted form.
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn create_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    visitor: Visitor,
    mut multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(&mut multipart).await?;

    let fields = match accept_submission(&state, &submission).await? {
        Ok(fields) => fields,
        Err(error) => {
            return reject_form(
                &visitor,
                "Add Jewelry Item",
                "/admin/add".to_owned(),
                submission.draft,
                error,
            )
            .await;
        }
    };

    let item = CatalogRepository::new(state.pool()).create(&fields).await?;
    tracing::info!(item_id = %item.id, "Created item");

    visitor
        .flash(FlashLevel::Success, "Jewelry item added successfully")
        .await?;
    Ok(Redirect::to("/admin").into_response())
}

/// Display the edit form for an item.
#[instrument(skip(state, visitor, _admin))]
pub async fn edit_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<ItemId>,
) -> Result<Response> {
    let Some(item) = CatalogRepository::new(state.pool()).get(id).await? else {
        return Ok(not_found(&visitor).await?.into_response());
    };

    Ok(ItemFormTemplate {
        page: PageContext::load(&visitor).await?,
        heading: "Edit Jewelry Item",
        action: format!("/admin/edit/{id}"),
        draft: ItemDraft::from_item(&item),
        error: None,
    }
    .into_response())
}

/// Replace every field of an item from the submitted form.
#[instrument(skip(state, visitor, admin, multipart), fields(admin = %admin.username))]
pub async fn update_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<ItemId>,
    mut multipart: Multipart,
) -> Result<Response> {
    let items = CatalogRepository::new(state.pool());
    let Some(existing) = items.get(id).await? else {
        return Ok(not_found(&visitor).await?.into_response());
    };

    let submission = read_submission(&mut multipart).await?;

    let fields = match accept_submission(&state, &submission).await? {
        Ok(fields) => fields,
        Err(error) => {
            return reject_form(
                &visitor,
                "Edit Jewelry Item",
                format!("/admin/edit/{id}"),
                submission.draft,
                error,
            )
            .await;
        }
    };

    if !items.update(id, &fields).await? {
        return Ok(not_found(&visitor).await?.into_response());
    }
    tracing::info!("Updated item");

    if let Some(old) = existing.fields.image_url
        && fields.image_url.as_deref() != Some(old.as_str())
    {
        discard_image(&state, &old).await;
    }

    visitor
        .flash(FlashLevel::Success, "Jewelry item updated successfully")
        .await?;
    Ok(Redirect::to("/admin").into_response())
}

/// Delete an item and drop it from every visitor's cart and favorites.
#[instrument(skip(state, visitor, admin), fields(admin = %admin.username))]
pub async fn delete_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<ItemId>,
) -> Result<Redirect> {
    let items = CatalogRepository::new(state.pool());
    let Some(item) = items.get(id).await? else {
        return not_found(&visitor).await;
    };
    if !items.delete(id).await? {
        return not_found(&visitor).await;
    }
    if let Some(url) = &item.fields.image_url {
        discard_image(&state, url).await;
    }

    let purged = state.sessions().purge_item(id).await?;
    visitor.forget_item(id).await?;
    tracing::info!(sessions = purged, "Deleted item");

    visitor
        .flash(FlashLevel::Success, "Jewelry item deleted successfully")
        .await?;
    Ok(Redirect::to("/admin"))
}
