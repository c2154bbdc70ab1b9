use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::{error, model, view::BookService};

#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    const API_RESOURCE_PREFIX: &str = "/api";

    pub fn new(base_url: &str) -> Self {
        let http_client = Client::new();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub async fn get_books(&self) -> error::Result<Vec<model::Book>> {
        self.request_resource("/books").await
    }

    pub async fn get_book(&self, id: model::BookId) -> error::Result<model::Book> {
        self.request_resource(&format!("/books/{id}")).await
    }

    pub async fn add_book(&self, info: model::NewBook) -> error::Result<model::Book> {
        self.post_resource("/books", info).await
    }

    pub async fn update_status(
        &self,
        id: model::BookId,
        status: model::Status,
    ) -> error::Result<model::Book> {
        self.put_resource(&format!("/books/{id}"), model::StatusUpdate { status })
            .await
    }

    pub async fn delete_book(&self, id: model::BookId) -> error::Result<()> {
        let resource_uri = self.resolve_resource_uri(&format!("/books/{id}"));
        let model::Deleted { .. } = self.send(self.http_client.delete(resource_uri)).await?;
        Ok(())
    }

    async fn post_resource<R, S>(&self, uri: &str, resource: R) -> error::Result<S>
    where
        R: Serialize,
        S: DeserializeOwned,
    {
        let resource_uri = self.resolve_resource_uri(uri);
        self.send(self.http_client.post(resource_uri).json(&resource))
            .await
    }

    async fn put_resource<R, S>(&self, uri: &str, resource: R) -> error::Result<S>
    where
        R: Serialize,
        S: DeserializeOwned,
    {
        let resource_uri = self.resolve_resource_uri(uri);
        self.send(self.http_client.put(resource_uri).json(&resource))
            .await
    }

    async fn request_resource<R>(&self, uri: &str) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let resource_uri = self.resolve_resource_uri(uri);
        self.send(self.http_client.get(resource_uri)).await
    }

    async fn send<R>(&self, request: RequestBuilder) -> error::Result<R>
    where
        R: DeserializeOwned,
    {
        let request = request.build()?;
        let response = self.http_client.execute(request).await?;
        decode_response(response).await
    }

    fn resolve_resource_uri(&self, resource_uri: &str) -> String {
        format!(
            "{}{}{resource_uri}",
            self.base_url,
            Self::API_RESOURCE_PREFIX
        )
    }
}

async fn decode_response<R>(response: Response) -> error::Result<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let message = serde_json::from_slice::<model::ErrorBody>(&bytes)
            .map(|model::ErrorBody { error }| error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        Err(error::Error::Server { status, message })
    }
}

impl BookService for ApiClient {
    async fn list(&self) -> error::Result<Vec<model::Book>> {
        self.get_books().await
    }

    async fn create(&self, info: model::NewBook) -> error::Result<model::Book> {
        self.add_book(info).await
    }

    async fn update_status(
        &self,
        id: model::BookId,
        status: model::Status,
    ) -> error::Result<model::Book> {
        ApiClient::update_status(self, id, status).await
    }

    async fn delete(&self, id: model::BookId) -> error::Result<()> {
        self.delete_book(id).await
    }
}
