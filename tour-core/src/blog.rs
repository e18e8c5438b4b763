//! # Blog Client
//!
//! CRUD over the `BlogService`, plus the server-streaming listing.
//!
//! Every response except `DeleteBlog` wraps the affected [`Blog`] in an optional field; a
//! response without it is reported as [`BlogCallError::MissingBlog`] rather than silently
//! yielding an empty blog.
use crate::BoxError;
use http_body::Body as HttpBody;
use tonic::{Status, transport::Channel};
use tour_proto::{
    BlogServiceClient,
    blog::{
        Blog, CreateBlogRequest, DeleteBlogRequest, ListBlogRequest, ReadBlogRequest,
        UpdateBlogRequest,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum BlogCallError {
    #[error("gRPC call failed: '{0}'")]
    Status(#[from] Status),
    #[error("The server response did not contain a blog")]
    MissingBlog,
}

impl BlogCallError {
    /// The gRPC status, if the server answered with one.
    pub fn status(&self) -> Option<&Status> {
        match self {
            BlogCallError::Status(status) => Some(status),
            BlogCallError::MissingBlog => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlogClient<S = Channel> {
    client: BlogServiceClient<S>,
}

impl<S> BlogClient<S>
where
    S: tonic::client::GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S) -> Self {
        Self {
            client: BlogServiceClient::new(service),
        }
    }

    /// Creates a blog. The returned blog carries the id assigned by the server.
    pub async fn create_blog(
        &mut self,
        author_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Blog, BlogCallError> {
        let blog = Blog {
            id: String::new(),
            author_id: author_id.into(),
            title: title.into(),
            content: content.into(),
        };

        let response = self
            .client
            .create_blog(CreateBlogRequest { blog: Some(blog) })
            .await?;

        response.into_inner().blog.ok_or(BlogCallError::MissingBlog)
    }

    pub async fn read_blog(&mut self, blog_id: impl Into<String>) -> Result<Blog, BlogCallError> {
        let response = self
            .client
            .read_blog(ReadBlogRequest {
                blog_id: blog_id.into(),
            })
            .await?;

        response.into_inner().blog.ok_or(BlogCallError::MissingBlog)
    }

    /// Replaces the author, title and content of the blog identified by `blog.id`.
    pub async fn update_blog(&mut self, blog: Blog) -> Result<Blog, BlogCallError> {
        let response = self
            .client
            .update_blog(UpdateBlogRequest { blog: Some(blog) })
            .await?;

        response.into_inner().blog.ok_or(BlogCallError::MissingBlog)
    }

    /// Deletes a blog and returns the id the server reports as deleted.
    pub async fn delete_blog(
        &mut self,
        blog_id: impl Into<String>,
    ) -> Result<String, BlogCallError> {
        let response = self
            .client
            .delete_blog(DeleteBlogRequest {
                blog_id: blog_id.into(),
            })
            .await?;

        Ok(response.into_inner().blog_id)
    }

    /// Lists every blog, invoking `on_blog` as each one arrives.
    pub async fn list_blogs(
        &mut self,
        mut on_blog: impl FnMut(&Blog),
    ) -> Result<Vec<Blog>, BlogCallError> {
        let mut stream = self
            .client
            .list_blog(ListBlogRequest {})
            .await?
            .into_inner();

        let mut blogs = Vec::new();

        while let Some(response) = stream.message().await? {
            let blog = response.blog.ok_or(BlogCallError::MissingBlog)?;
            on_blog(&blog);
            blogs.push(blog);
        }

        tracing::debug!(count = blogs.len(), "blog listing finished");
        Ok(blogs)
    }
}
