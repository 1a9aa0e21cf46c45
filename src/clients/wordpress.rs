//! WordPress publisher speaking the XML-RPC API (`xmlrpc.php`).
//!
//! Two methods are used:
//!
//! - `wp.uploadFile` to upload the featured image, returning an attachment id
//! - `wp.newPost` to create the post with its tags, categories and thumbnail
//!
//! Tags and categories are sent as `terms_names`, so WordPress creates any
//! term that does not exist yet.

use crate::clients::Publisher;
use crate::clients::xmlrpc::{self, Value};
use crate::config::WordPressConfig;
use crate::error::{Error, Service};
use crate::models::{Article, ArticleImage};
use reqwest::Client;
use tracing::{info, instrument};

pub struct WordPressClient {
    http: Client,
    endpoint: String,
    blog_id: i64,
    username: String,
    password: String,
    post_status: String,
}

impl WordPressClient {
    pub fn new(http: Client, config: &WordPressConfig) -> Self {
        Self {
            http,
            endpoint: config.xmlrpc_url.clone(),
            blog_id: config.blog_id,
            username: config.username.clone(),
            password: config.password.clone(),
            post_status: config.post_status.clone(),
        }
    }

    fn auth_params(&self) -> Vec<Value> {
        vec![
            Value::Int(self.blog_id),
            Value::string(&self.username),
            Value::string(&self.password),
        ]
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, Error> {
        let payload = xmlrpc::encode_call(method, params)?;
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml")
            .body(payload)
            .send()
            .await
            .map_err(Error::request(Service::Publishing))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(Error::request(Service::Publishing))?;
        if !status.is_success() {
            return Err(Error::Status {
                service: Service::Publishing,
                status,
                body,
            });
        }
        xmlrpc::parse_response(&body)
    }

    fn post_content(&self, article: &Article, thumbnail_id: Option<&str>) -> Value {
        let mut content = vec![
            ("post_type".to_string(), Value::string("post")),
            ("post_status".to_string(), Value::string(&self.post_status)),
            ("post_title".to_string(), Value::string(&article.title)),
            ("post_content".to_string(), Value::string(&article.body)),
            (
                "terms_names".to_string(),
                Value::Struct(vec![
                    ("post_tag".to_string(), Value::strings(&article.tags)),
                    ("category".to_string(), Value::strings(&article.categories)),
                ]),
            ),
        ];
        if let Some(id) = thumbnail_id {
            let thumbnail = id
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::string(id));
            content.push(("post_thumbnail".to_string(), thumbnail));
        }
        Value::Struct(content)
    }
}

impl Publisher for WordPressClient {
    #[instrument(level = "info", skip_all, fields(filename = %image.filename, bytes = image.bytes.len()))]
    async fn upload_image(&self, image: &ArticleImage) -> Result<String, Error> {
        let mut params = self.auth_params();
        params.push(Value::Struct(vec![
            ("name".to_string(), Value::string(&image.filename)),
            ("type".to_string(), Value::string("image/jpeg")),
            ("bits".to_string(), Value::Base64(image.bytes.clone())),
            ("overwrite".to_string(), Value::Bool(true)),
        ]));

        let response = self.call("wp.uploadFile", &params).await?;
        let id = response
            .member("id")
            .or_else(|| response.member("attachment_id"))
            .and_then(Value::as_id)
            .ok_or_else(|| Error::Xml("wp.uploadFile response has no id".to_string()))?;
        info!(attachment_id = %id, "Uploaded image");
        Ok(id)
    }

    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    async fn publish(&self, article: &Article, thumbnail_id: Option<&str>) -> Result<String, Error> {
        let mut params = self.auth_params();
        params.push(self.post_content(article, thumbnail_id));

        let response = self.call("wp.newPost", &params).await?;
        let post_id = response
            .as_id()
            .ok_or_else(|| Error::Xml("wp.newPost returned no post id".to_string()))?;
        info!(%post_id, "Created post");
        Ok(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header, method, path},
    };

    fn client(server: &MockServer) -> WordPressClient {
        WordPressClient::new(
            Client::new(),
            &WordPressConfig {
                xmlrpc_url: format!("{}/xmlrpc.php", server.uri()),
                username: "editor".to_string(),
                password: "hunter2".to_string(),
                blog_id: 0,
                post_status: "publish".to_string(),
            },
        )
    }

    fn article() -> Article {
        Article {
            topic: "AI Chips 2023".to_string(),
            title: "The Silicon Race".to_string(),
            body: "Chips are fast.".to_string(),
            tags: vec!["AI".to_string(), "Hardware".to_string()],
            categories: vec!["Technology".to_string()],
            image: None,
        }
    }

    fn xml_value(inner: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><methodResponse><params><param><value>{inner}</value></param></params></methodResponse>"
        )
    }

    #[tokio::test]
    async fn test_upload_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc.php"))
            .and(header("Content-Type", "text/xml"))
            .and(body_string_contains("<methodName>wp.uploadFile</methodName>"))
            .and(body_string_contains("<string>AI_Chips_2023.jpg</string>"))
            .and(body_string_contains("<string>image/jpeg</string>"))
            .and(body_string_contains("<base64>/9j/</base64>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml_value(
                "<struct><member><name>id</name><value><string>321</string></value></member></struct>",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .upload_image(&ArticleImage {
                filename: "AI_Chips_2023.jpg".to_string(),
                bytes: vec![0xff, 0xd8, 0xff],
            })
            .await
            .unwrap();
        assert_eq!(id, "321");
    }

    #[tokio::test]
    async fn test_publish_with_thumbnail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc.php"))
            .and(body_string_contains("<methodName>wp.newPost</methodName>"))
            .and(body_string_contains("<string>editor</string>"))
            .and(body_string_contains(
                "<name>post_title</name><value><string>The Silicon Race</string></value>",
            ))
            .and(body_string_contains("<name>post_tag</name><value><array><data><value><string>AI</string></value><value><string>Hardware</string></value></data></array></value>"))
            .and(body_string_contains("<name>post_thumbnail</name><value><int>321</int></value>"))
            .and(body_string_contains("<name>post_status</name><value><string>publish</string></value>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml_value("<string>987</string>")))
            .expect(1)
            .mount(&server)
            .await;

        let post_id = client(&server)
            .publish(&article(), Some("321"))
            .await
            .unwrap();
        assert_eq!(post_id, "987");
    }

    #[tokio::test]
    async fn test_publish_without_thumbnail_omits_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xmlrpc.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml_value("<string>5</string>")))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).publish(&article(), None).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(!body.contains("post_thumbnail"));
    }

    #[tokio::test]
    async fn test_fault_is_an_error() {
        let server = MockServer::start().await;
        let fault = "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
<member><name>faultCode</name><value><int>403</int></value></member>\
<member><name>faultString</name><value><string>Incorrect username or password.</string></value></member>\
</struct></value></fault></methodResponse>";
        Mock::given(method("POST"))
            .and(path("/xmlrpc.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fault))
            .mount(&server)
            .await;

        let err = client(&server).publish(&article(), None).await.unwrap_err();
        assert!(matches!(err, Error::Fault { code: 403, .. }));
    }
}
