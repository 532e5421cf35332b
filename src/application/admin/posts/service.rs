use std::sync::Arc;

use crate::application::repos::{CategoriesRepo, PostsRepo, PostsWriteRepo};
use crate::application::resource::PostResource;

#[derive(Clone)]
pub struct AdminPostService {
    pub(crate) resource: Arc<PostResource>,
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) categories: Arc<dyn CategoriesRepo>,
    pub(crate) sanitizer: Arc<ammonia::Builder<'static>>,
}

impl AdminPostService {
    pub fn new(
        resource: Arc<PostResource>,
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
    ) -> Self {
        Self {
            resource,
            reader,
            writer,
            categories,
            sanitizer: Arc::new(build_content_sanitizer()),
        }
    }

    pub fn resource(&self) -> &PostResource {
        &self.resource
    }
}

/// Rich-editor output is stored as HTML; strip anything outside the usual editor vocabulary.
fn build_content_sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder.add_tags(&["figure", "figcaption", "s"]);
    builder
}
