use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use sha2::{Digest, Sha256};

use ::common::Ingestor;
use ::common::config::{CloudinaryConfig, CompressionPolicy};
use ::common::storage::{AssetStore, RemoteAsset, StorageError, UploadRequest};
use server::config::{
    AppConfig, CorsConfig, DatabaseConfig, MediaConfig, ServerConfig, SiteConfig,
};
use server::state::AppState;

/// Uploads larger than this are re-encoded before reaching the store.
pub const TEST_MAX_BYTES: u64 = 64 * 1024;

pub const DEFAULT_COPYRIGHT: &str = "© Test Studio";

pub mod routes {
    pub const MEDIA: &str = "/api/v1/media";
    pub const CONTENT: &str = "/api/v1/content";

    pub fn media(id: &str) -> String {
        format!("/api/v1/media/{id}")
    }

    pub fn media_page(page: &str, mode: &str) -> String {
        format!("/api/v1/media?page={page}&mode={mode}")
    }

    pub fn media_titled(title: &str) -> String {
        format!("/api/v1/media?mode=compact&title={title}")
    }

    pub fn section(slug: &str) -> String {
        format!("/api/v1/content/sections/{slug}")
    }
}

/// In-process image host.
///
/// Public IDs are derived from the content hash, so re-uploading the same bytes
/// yields the same ID. Payloads starting with `FAIL` are rejected.
#[derive(Default)]
pub struct FakeStore {
    /// Sizes of the payloads received, in order.
    pub received: Mutex<Vec<usize>>,
}

#[async_trait]
impl AssetStore for FakeStore {
    async fn upload(&self, request: UploadRequest) -> Result<RemoteAsset, StorageError> {
        if request.bytes.starts_with(b"FAIL") {
            return Err(StorageError::Rejected {
                status: 400,
                message: "Invalid image file".into(),
            });
        }

        self.received.lock().unwrap().push(request.bytes.len());
        let digest = hex::encode(Sha256::digest(&request.bytes));
        let public_id = format!("{}/{}", request.folder, &digest[..16]);

        Ok(RemoteAsset {
            secure_url: format!("https://res.example.com/demo/image/upload/v1/{public_id}.jpg"),
            public_id,
            width: 640,
            height: 480,
            bytes: Some(request.bytes.len() as u64),
            format: "jpg".into(),
        })
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub store: Arc<FakeStore>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let db = server::database::init_db(&database)
            .await
            .expect("Failed to initialize test database");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database,
            cloudinary: CloudinaryConfig::new("demo", "test-key", "test-secret"),
            media: MediaConfig::default(),
            compression: CompressionPolicy {
                max_bytes: TEST_MAX_BYTES,
                ..CompressionPolicy::default()
            },
            site: SiteConfig {
                default_copyright: DEFAULT_COPYRIGHT.to_string(),
            },
        };

        let store = Arc::new(FakeStore::default());
        let ingestor = Ingestor::new(store.clone(), app_config.compression.clone());

        let state = AppState {
            db: db.clone(),
            config: app_config,
            ingestor,
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Upload files under the repeatable `images` field.
    pub async fn upload(&self, files: Vec<(&str, Vec<u8>)>) -> TestResponse {
        let mut form = Form::new();
        for (name, bytes) in files {
            form = form.part("images", image_part(name, bytes));
        }
        self.post_form(routes::MEDIA, form).await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}

pub fn image_part(name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name(name.to_string())
}

/// Small, valid PNG whose bytes differ per `seed`.
pub fn tiny_png(seed: u8) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([seed, 128, 255 - seed]));
    encode_png(img)
}

/// PNG of random-looking pixels; compresses badly, so it is large for its size.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let img = image::RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    encode_png(img)
}

fn encode_png(img: image::RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    out.into_inner()
}
