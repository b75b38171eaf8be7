use axum::extract::multipart::Field;
use axum::extract::Multipart;
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use application::transfer::{
    CreateListingDto, DeleteListingDto, GetListingDto, GetListingsByUsernameDto, ImageUploadDto,
    SearchListingsDto, UpdateListingDto,
};
use kernel::{rejected, KernelError, UserMessage};

use crate::controller::{Intake, TryIntake};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    q: String,
}

#[derive(Debug)]
pub struct GetRequest {
    id: Uuid,
}

impl GetRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// Text fields and image of a `multipart/form-data` listing submission.
#[derive(Default)]
pub struct CreateForm {
    title: String,
    description: Option<String>,
    price_per_day: String,
    condition: String,
    location: String,
    category: String,
    image: Option<ImageUploadDto>,
}

async fn text(field: Field<'_>) -> error_stack::Result<String, KernelError> {
    field
        .text()
        .await
        .change_context_lazy(|| KernelError::Validation)
        .attach_printable_lazy(|| UserMessage::new("Invalid form data"))
}

impl CreateForm {
    pub async fn read(mut multipart: Multipart) -> error_stack::Result<Self, KernelError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .change_context_lazy(|| KernelError::Validation)
            .attach_printable_lazy(|| UserMessage::new("Invalid form data"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = text(field).await?,
                "description" => form.description = Some(text(field).await?),
                "price_per_day" => form.price_per_day = text(field).await?,
                "condition" => form.condition = text(field).await?,
                "location" => form.location = text(field).await?,
                "category" => form.category = text(field).await?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .change_context_lazy(|| KernelError::Validation)
                        .attach_printable_lazy(|| UserMessage::new("Invalid form data"))?;
                    form.image = Some(ImageUploadDto {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                other => tracing::debug!("ignoring form field {other}"),
            }
        }
        Ok(form)
    }
}

/// Absent keys leave a field untouched. `"description": null` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    description: Option<Option<String>>,
    price_per_day: Option<i64>,
    condition: Option<String>,
    location: Option<String>,
    category: Option<String>,
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug)]
pub struct DeleteRequest {
    actor: Uuid,
    id: Uuid,
}

impl DeleteRequest {
    pub fn new(actor: Uuid, id: Uuid) -> Self {
        Self { actor, id }
    }
}

#[derive(Debug)]
pub struct ByUsernameRequest {
    username: String,
}

impl ByUsernameRequest {
    pub fn new(username: String) -> Self {
        Self { username }
    }
}

pub struct Transformer;

impl Intake<SearchRequest> for Transformer {
    type To = SearchListingsDto;
    fn emit(&self, input: SearchRequest) -> Self::To {
        SearchListingsDto { query: input.q }
    }
}

impl Intake<GetRequest> for Transformer {
    type To = GetListingDto;
    fn emit(&self, input: GetRequest) -> Self::To {
        GetListingDto { id: input.id }
    }
}

impl TryIntake<(Uuid, CreateForm)> for Transformer {
    type To = CreateListingDto;
    type Error = Report<KernelError>;
    fn emit(&self, input: (Uuid, CreateForm)) -> Result<Self::To, Self::Error> {
        let (owner, form) = input;
        let price = form.price_per_day.trim();
        let price_per_day = if price.is_empty() {
            None
        } else {
            Some(price.parse::<i64>().map_err(|_| {
                rejected(
                    KernelError::Validation,
                    "Price per day must be a whole number",
                )
            })?)
        };
        Ok(CreateListingDto {
            owner,
            title: form.title,
            description: form.description,
            price_per_day,
            condition: form.condition,
            location: form.location,
            category: form.category,
            image: form.image,
        })
    }
}

impl Intake<(Uuid, Uuid, UpdateRequest)> for Transformer {
    type To = UpdateListingDto;
    fn emit(&self, input: (Uuid, Uuid, UpdateRequest)) -> Self::To {
        let (actor, id, input) = input;
        UpdateListingDto {
            actor,
            id,
            title: input.title,
            description: input.description,
            price_per_day: input.price_per_day,
            condition: input.condition,
            location: input.location,
            category: input.category,
        }
    }
}

impl Intake<DeleteRequest> for Transformer {
    type To = DeleteListingDto;
    fn emit(&self, input: DeleteRequest) -> Self::To {
        DeleteListingDto {
            actor: input.actor,
            id: input.id,
        }
    }
}

impl Intake<ByUsernameRequest> for Transformer {
    type To = GetListingsByUsernameDto;
    fn emit(&self, input: ByUsernameRequest) -> Self::To {
        GetListingsByUsernameDto {
            username: input.username,
        }
    }
}
