use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::{future::Future, result::Result as StdResult, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    core::{model::BookId, Application},
    error::{Error, Result},
    infrastructure::RecordStore,
};

pub mod model;

const API_RESOURCE_PREFIX: &str = "/api";

type ApiResult<A> = StdResult<A, ApiError>;

type ApplicationInner<RS> = Arc<Application<RS>>;
pub struct Api<RS>(ApplicationInner<RS>);

impl<RS> Api<RS>
where
    RS: RecordStore + 'static,
{
    pub fn new(application: Application<RS>) -> Self {
        Self(Arc::new(application))
    }

    pub fn router(&self) -> Router {
        let Self(application) = self;
        routing_configuration()
            .with_state(Arc::clone(application))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn start<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let routes = self.router();
        Ok(axum::serve(listener, routes)
            .with_graceful_shutdown(shutdown)
            .await?)
    }
}

fn routing_configuration<RS>() -> Router<ApplicationInner<RS>>
where
    RS: RecordStore + 'static,
{
    let books = Router::new()
        .route("/", get(books::list))
        .route("/", post(books::create))
        .route("/:id", get(books::get))
        .route("/:id", put(books::update_status))
        .route("/:id", delete(books::remove));

    let api = Router::new().nest("/books", books);

    Router::new()
        .route("/", get(system_root))
        .nest(API_RESOURCE_PREFIX, api)
}

#[derive(Debug)]
pub enum ApiError {
    Application(Error),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Application(Error::Validation(..)) | ApiError::BadRequest(..) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Application(Error::NotFound(..)) => StatusCode::NOT_FOUND,
            ApiError::Application(..) | ApiError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self::Application(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Application(error) => {
                if error.is_storage_failure() {
                    tracing::error!(%error, "request failed");
                } else {
                    tracing::debug!(%error, "request rejected");
                }
                error.to_string()
            }
            ApiError::BadRequest(message) => message,
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                message
            }
        };

        (status, Json(model::ErrorBody { error })).into_response()
    }
}

fn created_response(book: model::Book) -> ApiResult<(StatusCode, HeaderMap, Json<model::Book>)> {
    let mut headers = HeaderMap::default();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(&resource_location(book.id))
            .map_err(|e| ApiError::Internal(format!("unusable Location header: {e}")))?,
    );
    Ok((StatusCode::CREATED, headers, Json(book)))
}

fn resource_location(id: BookId) -> String {
    format!("{API_RESOURCE_PREFIX}/books/{id}")
}

mod books {
    use super::*;

    pub async fn list<RS>(
        State(application): State<ApplicationInner<RS>>,
    ) -> ApiResult<Json<Vec<model::Book>>>
    where
        RS: RecordStore + 'static,
    {
        Ok(Json(
            application
                .list_books()
                .await?
                .into_iter()
                .map(|b| b.into())
                .collect(),
        ))
    }

    pub async fn get<RS>(
        State(application): State<ApplicationInner<RS>>,
        path: StdResult<Path<BookId>, PathRejection>,
    ) -> ApiResult<Json<model::Book>>
    where
        RS: RecordStore + 'static,
    {
        let Path(id) = path?;
        if let Some(book) = application.book(id).await? {
            Ok(Json(book.into()))
        } else {
            Err(Error::NotFound(id).into())
        }
    }

    pub async fn create<RS>(
        State(application): State<ApplicationInner<RS>>,
        body: StdResult<Json<model::NewBook>, JsonRejection>,
    ) -> ApiResult<Response>
    where
        RS: RecordStore + 'static,
    {
        let Json(model::NewBook { title, author }) = body?;
        let book = application.add_book(&title, &author).await?;
        Ok(created_response(book.into())?.into_response())
    }

    pub async fn update_status<RS>(
        State(application): State<ApplicationInner<RS>>,
        path: StdResult<Path<BookId>, PathRejection>,
        body: StdResult<Json<model::StatusUpdate>, JsonRejection>,
    ) -> ApiResult<Json<model::Book>>
    where
        RS: RecordStore + 'static,
    {
        let Path(id) = path?;
        let Json(model::StatusUpdate { status }) = body?;
        Ok(Json(application.update_status(id, &status).await?.into()))
    }

    pub async fn remove<RS>(
        State(application): State<ApplicationInner<RS>>,
        path: StdResult<Path<BookId>, PathRejection>,
    ) -> ApiResult<Json<model::Deleted>>
    where
        RS: RecordStore + 'static,
    {
        let Path(id) = path?;
        application.remove_book(id).await?;
        Ok(Json(model::Deleted { success: true }))
    }
}

async fn system_root<RS>(State(_application): State<ApplicationInner<RS>>) -> ApiResult<String>
where
    RS: RecordStore + 'static,
{
    Ok("Booksorter 0.1 running.".to_owned())
}
