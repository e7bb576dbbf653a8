//! Manifest loading.
//!
//! [`ManifestLoader`] runs the ingestion pipeline once per instance:
//! acquire the document, detect its Presentation API version, convert v2
//! documents to the v3 shape, validate the root, resolve referenced
//! annotation pages and normalize legacy annotation shapes.
//!
//! The loader never returns an error from [`ManifestLoader::load`]. Fatal
//! problems are recorded and the loader moves to [`LoaderStatus::Error`];
//! callers inspect [`ManifestLoader::errors`].

mod normalize;

pub use normalize::normalize_v2;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::IiifError;
use crate::fetch::JsonFetcher;
use crate::resource::{as_items, Resource, ResourceParser};
use crate::template::TemplateRegistry;
use crate::upgrade::{upgrade_annotation_page, upgrade_document};
use crate::validation::{detect_version, validate_root, ApiVersion, RootType};

/// Where the manifest comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ManifestSource {
    /// Fetched with the loader's [`JsonFetcher`].
    Url(String),
    /// Used as-is.
    Document(Value),
}

impl From<Value> for ManifestSource {
    /// A JSON string is a URL; anything else is the document itself.
    fn from(value: Value) -> Self {
        match value {
            Value::String(url) => ManifestSource::Url(url),
            other => ManifestSource::Document(other),
        }
    }
}

impl From<&str> for ManifestSource {
    fn from(url: &str) -> Self {
        ManifestSource::Url(url.to_string())
    }
}

impl From<String> for ManifestSource {
    fn from(url: String) -> Self {
        ManifestSource::Url(url)
    }
}

/// Lifecycle of a [`ManifestLoader`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoaderStatus {
    #[default]
    Initial,
    Loading,
    Loaded,
    Error,
}

/// Single-shot manifest loader.
#[derive(Debug)]
pub struct ManifestLoader {
    source: Option<ManifestSource>,
    data: Option<Value>,
    version: Option<ApiVersion>,
    root: Option<RootType>,
    errors: Vec<IiifError>,
    status: LoaderStatus,
}

impl ManifestLoader {
    pub fn new(source: impl Into<ManifestSource>) -> Self {
        Self {
            source: Some(source.into()),
            data: None,
            version: None,
            root: None,
            errors: Vec::new(),
            status: LoaderStatus::Initial,
        }
    }

    /// Runs the pipeline. Calls after the first one do nothing.
    pub fn load(&mut self, fetcher: &dyn JsonFetcher) {
        if self.status != LoaderStatus::Initial {
            debug!("Loader already ran (status {:?})", self.status);
            return;
        }
        self.status = LoaderStatus::Loading;

        match self.run(fetcher) {
            Ok((document, root)) => {
                self.data = Some(document);
                self.root = Some(root);
                self.status = LoaderStatus::Loaded;
            }
            Err(error) => self.add_error(error),
        }
    }

    fn run(&mut self, fetcher: &dyn JsonFetcher) -> Result<(Value, RootType), IiifError> {
        let document = self.acquire(fetcher)?;

        let version = detect_version(&document)?;
        self.version = Some(version);
        debug!("Detected Presentation API {version}");

        let mut document = match version {
            ApiVersion::V2 => upgrade_document(&document)?,
            ApiVersion::V3 => document,
        };

        let root = validate_root(&document)?;
        aggregate_annotation_pages(&mut document, version, fetcher);
        if version == ApiVersion::V2 {
            normalize_v2(&mut document);
        }
        Ok((document, root))
    }

    fn acquire(&mut self, fetcher: &dyn JsonFetcher) -> Result<Value, IiifError> {
        let document = match self.source.take() {
            Some(ManifestSource::Url(url)) => {
                debug!("Fetching manifest {url}");
                fetcher
                    .fetch_json(&url)
                    .map_err(|error| IiifError::ManifestUnreachable {
                        message: error.to_string(),
                        url,
                    })?
            }
            Some(ManifestSource::Document(document)) => document,
            None => return Err(IiifError::InvalidData),
        };
        if document.is_object() {
            Ok(document)
        } else {
            Err(IiifError::InvalidData)
        }
    }

    fn add_error(&mut self, error: IiifError) {
        debug!("Manifest load failed: {error}");
        self.errors.push(error);
        self.status = LoaderStatus::Error;
    }

    pub fn status(&self) -> LoaderStatus {
        self.status
    }

    pub fn has_errors(&self) -> bool {
        self.status == LoaderStatus::Error
    }

    pub fn has_loaded(&self) -> bool {
        self.status == LoaderStatus::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoaderStatus::Loading
    }

    /// The canonical document, once loaded.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Consumes the loader, returning the canonical document.
    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    /// The typed parser for the root document.
    pub fn parser(&self) -> Option<Resource<'_>> {
        self.data.as_ref().map(Resource::create)
    }

    /// Like [`parser`](Self::parser), with a manifest root decoding its
    /// annotations against `templates`.
    pub fn parser_with_templates<'a>(
        &'a self,
        templates: &'a TemplateRegistry,
    ) -> Option<Resource<'a>> {
        self.parser().map(|resource| match resource {
            Resource::Manifest(manifest) => {
                Resource::Manifest(manifest.with_templates(templates))
            }
            other => other,
        })
    }

    /// Every recorded error, in order.
    pub fn errors(&self) -> &[IiifError] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn is_collection(&self) -> bool {
        self.root == Some(RootType::Collection)
    }

    /// The detected version of the source document.
    pub fn version(&self) -> Option<ApiVersion> {
        self.version
    }
}

/// A canvas `annotations` entry that only references its page.
fn is_page_stub(page: &Value) -> bool {
    let parser = ResourceParser::new(page);
    parser.resource_type() == Some("AnnotationPage")
        && page.get("items").is_none()
        && parser.id().is_some()
}

/// Replaces annotation page stubs with the fetched pages, one request at a
/// time. Failed fetches leave the stub in place.
fn aggregate_annotation_pages(
    document: &mut Value,
    version: ApiVersion,
    fetcher: &dyn JsonFetcher,
) {
    let mut stubs: Vec<(usize, usize, String)> = Vec::new();
    if let Some(items) = document.get("items") {
        for (canvas_idx, canvas) in as_items(items).enumerate() {
            if ResourceParser::new(canvas).resource_type() != Some("Canvas") {
                continue;
            }
            let Some(pages) = canvas.get("annotations").and_then(Value::as_array) else {
                continue;
            };
            for (page_idx, page) in pages.iter().enumerate() {
                if !is_page_stub(page) {
                    continue;
                }
                if let Some(id) = ResourceParser::new(page).id() {
                    stubs.push((canvas_idx, page_idx, id.to_string()));
                }
            }
        }
    }

    for (canvas_idx, page_idx, url) in stubs {
        let Some(page) = fetch_page(&url, version, fetcher) else {
            continue;
        };
        if let Some(slot) = document
            .get_mut("items")
            .and_then(|items| items.get_mut(canvas_idx))
            .and_then(|canvas| canvas.get_mut("annotations"))
            .and_then(|pages| pages.get_mut(page_idx))
        {
            *slot = page;
        }
    }
}

fn fetch_page(url: &str, version: ApiVersion, fetcher: &dyn JsonFetcher) -> Option<Value> {
    let fetched = match fetcher.fetch_json(url) {
        Ok(fetched) => fetched,
        Err(error) => {
            warn!("Failed to load annotation page {url}: {error}");
            return None;
        }
    };
    let page = match version {
        ApiVersion::V2 => match upgrade_annotation_page(&fetched) {
            Ok(page) => page,
            Err(error) => {
                warn!("Failed to convert annotation page {url}: {error}");
                return None;
            }
        },
        ApiVersion::V3 => fetched,
    };
    if ResourceParser::new(&page).resource_type() == Some("AnnotationPage") {
        debug!("Resolved annotation page {url}");
        Some(page)
    } else {
        warn!("Document at {url} is not an annotation page");
        None
    }
}
