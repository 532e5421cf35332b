use std::collections::BTreeSet;

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use futures::StreamExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};
use url::form_urlencoded::Serializer;
use uuid::Uuid;

use crate::{
    application::{
        admin::posts::PostListQuery,
        pagination::PageRequest,
        repos::PostSort,
        resource::{
            filters::{DateRange, FilterState, parse_date_input},
            form::{FieldKind, FieldValue, FormSchema, FormState},
            table::TableSchema,
        },
    },
    domain::entities::CoverRecord,
    infra::uploads::{MediaStorage, MediaStorageError},
};

use super::super::shared::blank_to_none;

const SOURCE: &str = "infra::http::admin::posts::forms";

/// Raw index query string. Everything is optional and parsed leniently except dates and sort.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostIndexQuery {
    pub(crate) page: Option<String>,
    pub(crate) per_page: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) publish: Option<String>,
    pub(crate) draft: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) from: Option<String>,
    pub(crate) until: Option<String>,
    pub(crate) columns: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum IndexQueryError {
    #[error("invalid `{field}` date `{value}`, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("unknown sort `{0}`")]
    InvalidSort(String),
}

/// The index query after validation, plus what is needed to rebuild links.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedIndexQuery {
    pub(crate) list: PostListQuery,
    pub(crate) toggled: BTreeSet<String>,
}

impl AdminPostIndexQuery {
    pub(crate) fn resolve(
        &self,
        default_per_page: u32,
        table: &TableSchema,
    ) -> Result<ResolvedIndexQuery, IndexQueryError> {
        let sort = PostSort::parse(self.sort.as_deref())
            .ok_or_else(|| IndexQueryError::InvalidSort(self.sort.clone().unwrap_or_default()))?;

        let created = DateRange {
            from: parse_optional_date("from", self.from.as_deref())?,
            until: parse_optional_date("until", self.until.as_deref())?,
        };

        let page = parse_number(self.page.as_deref()).unwrap_or(1);
        let per_page = parse_number(self.per_page.as_deref()).unwrap_or(default_per_page);

        let toggled = self
            .columns
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                table
                    .toggleable_columns()
                    .find(|column| column_matches(column.name(), token))
                    .map(|column| column.name().to_string())
            })
            .collect();

        Ok(ResolvedIndexQuery {
            list: PostListQuery {
                search: blank_to_none(self.search.as_deref()),
                sort,
                filters: FilterState {
                    publish: is_checked(self.publish.as_deref()),
                    draft: is_checked(self.draft.as_deref()),
                    category: blank_to_none(self.category.as_deref()),
                    created,
                },
                page: PageRequest::new(page, per_page),
            },
            toggled,
        })
    }
}

impl ResolvedIndexQuery {
    /// Index link preserving every active parameter, with `page` and `sort` replaced.
    pub(crate) fn href(&self, base: &str, page: u32, sort: PostSort) -> String {
        let list = &self.list;
        let mut serializer = Serializer::new(String::new());

        if page > 1 {
            serializer.append_pair("page", &page.to_string());
        }
        serializer.append_pair("per_page", &list.page.per_page().to_string());
        if let Some(search) = list.search.as_deref() {
            serializer.append_pair("search", search);
        }
        if let Some(sort) = sort.as_param() {
            serializer.append_pair("sort", sort);
        }
        if list.filters.publish {
            serializer.append_pair("publish", "1");
        }
        if list.filters.draft {
            serializer.append_pair("draft", "1");
        }
        if let Some(category) = list.filters.category.as_deref() {
            serializer.append_pair("category", category);
        }
        if let Some(from) = list.filters.created.from {
            serializer.append_pair("from", &from.to_string());
        }
        if let Some(until) = list.filters.created.until {
            serializer.append_pair("until", &until.to_string());
        }
        if !self.toggled.is_empty() {
            let columns = self.toggled.iter().cloned().collect::<Vec<_>>().join(",");
            serializer.append_pair("columns", &columns);
        }

        format!("{base}?{}", serializer.finish())
    }
}

/// `category` selects `category.name`; the full dotted name works too.
fn column_matches(column: &str, token: &str) -> bool {
    column == token || column.split('.').next() == Some(token)
}

fn parse_optional_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<time::Date>, IndexQueryError> {
    match blank_to_none(raw) {
        None => Ok(None),
        Some(value) => parse_date_input(&value)
            .map(Some)
            .map_err(|_| IndexQueryError::InvalidDate { field, value }),
    }
}

fn parse_number(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse().ok())
}

fn is_checked(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| FieldValue::text(value).as_flag())
}

/// Bulk action payload; `ids` may repeat or be comma-separated.
pub(crate) fn collect_ids(pairs: &[(String, String)]) -> Result<Vec<Uuid>, uuid::Error> {
    let mut ids = Vec::new();
    for (_, value) in pairs.iter().filter(|(key, _)| key == "ids") {
        for raw in value.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
            let id = Uuid::parse_str(raw)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminSlugSignals {
    #[serde(default)]
    pub(crate) title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminTagAttachForm {
    pub(crate) tag_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminTagCreateForm {
    pub(crate) name: String,
}

/// A parsed multipart create/update submission.
#[derive(Debug)]
pub(crate) struct PostSubmission {
    pub(crate) form: FormState,
    pub(crate) cover: Option<CoverRecord>,
    pub(crate) remove_cover: bool,
}

#[derive(Debug, Error)]
pub(crate) enum SubmissionError {
    #[error("multipart payload could not be read")]
    Multipart {
        status: StatusCode,
        #[source]
        source: axum_extra::extract::multipart::MultipartError,
    },
    #[error(transparent)]
    Storage(#[from] MediaStorageError),
}

/// Read every part, storing the cover as it streams in.
///
/// A cover stored before a later part fails is deleted again before the error is returned.
///
/// Fields unknown to `schema` are ignored. A file part with no name or no bytes counts as
/// "no new cover".
pub(crate) async fn read_post_submission(
    multipart: &mut Multipart,
    schema: &FormSchema,
    media: &MediaStorage,
) -> Result<PostSubmission, SubmissionError> {
    let mut submission = PostSubmission {
        form: FormState::default(),
        cover: None,
        remove_cover: false,
    };

    match read_parts(multipart, schema, media, &mut submission).await {
        Ok(()) => Ok(submission),
        Err(err) => {
            if let Some(cover) = submission.cover.take() {
                discard_cover(media, &cover).await;
            }
            Err(err)
        }
    }
}

async fn read_parts(
    multipart: &mut Multipart,
    schema: &FormSchema,
    media: &MediaStorage,
    submission: &mut PostSubmission,
) -> Result<(), SubmissionError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                let status = err.status();
                error!(
                    target = SOURCE,
                    status = status.as_u16(),
                    error = %err,
                    "failed to read multipart payload"
                );
                return Err(SubmissionError::Multipart {
                    status,
                    source: err,
                });
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "remove_cover" {
            let value = read_text(field).await?;
            submission.remove_cover = FieldValue::text(value).as_flag();
            continue;
        }

        let Some(spec) = schema.field(&name) else {
            continue;
        };

        match spec.kind() {
            FieldKind::FileUpload { collection } => {
                let filename = field
                    .file_name()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string);
                let Some(filename) = filename else {
                    continue;
                };
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| {
                        mime_guess::from_path(&filename)
                            .first()
                            .map(|mime| mime.to_string())
                    })
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let stream = field.map(|result| {
                    result.map_err(|err| {
                        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                            MediaStorageError::PayloadTooLarge {
                                source: Box::new(err),
                            }
                        } else {
                            MediaStorageError::PayloadStream {
                                source: Box::new(err),
                            }
                        }
                    })
                });

                match media
                    .store_stream(collection, &filename, &content_type, stream)
                    .await
                {
                    Ok(cover) => {
                        if let Some(previous) = submission.cover.replace(cover) {
                            discard_cover(media, &previous).await;
                        }
                    }
                    Err(MediaStorageError::EmptyPayload) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            FieldKind::Toggle => {
                let value = read_text(field).await?;
                submission
                    .form
                    .fill(spec.name(), FieldValue::Flag(FieldValue::text(value).as_flag()));
            }
            FieldKind::Select { .. } | FieldKind::TextInput | FieldKind::RichEditor => {
                let value = read_text(field).await?;
                submission.form.fill(spec.name(), FieldValue::text(value));
            }
        }
    }

    Ok(())
}

async fn discard_cover(media: &MediaStorage, cover: &CoverRecord) {
    if let Err(err) = media.delete(&cover.stored_path).await {
        warn!(
            target = SOURCE,
            path = %cover.stored_path,
            error = %err,
            "failed to remove cover from an abandoned submission"
        );
    }
}

async fn read_text(
    field: axum_extra::extract::multipart::Field,
) -> Result<String, SubmissionError> {
    field.text().await.map_err(|err| SubmissionError::Multipart {
        status: err.status(),
        source: err,
    })
}
