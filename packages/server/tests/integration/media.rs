use reqwest::multipart::{Form, Part};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use server::entity::media_asset;

use crate::common::{TEST_MAX_BYTES, TestApp, image_part, noisy_png, routes, tiny_png};

async fn catalog_size(app: &TestApp) -> u64 {
    media_asset::Entity::find()
        .count(&app.db)
        .await
        .expect("count query")
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<_> = value
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn single_image_is_catalogued() {
        let app = TestApp::spawn().await;

        let res = app.upload(vec![("team_offsite-2024.png", tiny_png(1))]).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["count"], 1);
        assert!(res.body["errors"].is_null());

        let image = &res.body["images"][0];
        assert_eq!(image["title"], "team offsite 2024");
        let original = image["original_url"].as_str().unwrap();
        assert!(original.starts_with("https://res.example.com/demo/image/upload/v1/uploads/"));
        assert_eq!(
            image["web_url"],
            original.replace("/upload/", "/upload/f_webp,q_80,w_1920,c_limit/")
        );
        assert_eq!(
            image["thumbnail_url"],
            original.replace("/upload/", "/upload/f_webp,q_70,w_300,c_limit/")
        );
        assert_eq!(catalog_size(&app).await, 1);
    }

    #[tokio::test]
    async fn legacy_field_with_metadata() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .part("image", image_part("hero.png", tiny_png(2)))
            .text("folder", "/site/hero/")
            .text("title", "Hero banner")
            .text("description", "Front page");

        let res = app.post_form(routes::MEDIA, form).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let id = res.body["images"][0]["id"].as_str().unwrap();
        let detail = app.get(&routes::media(id)).await;
        assert_eq!(detail.status, 200);
        assert_eq!(detail.body["title"], "Hero banner");
        assert_eq!(detail.body["description"], "Front page");
        assert_eq!(detail.body["folder"], "site/hero");
        assert_eq!(detail.body["width"], 640);
        assert_eq!(detail.body["height"], 480);
        assert!(
            detail.body["public_id"]
                .as_str()
                .unwrap()
                .starts_with("site/hero/")
        );
    }

    #[tokio::test]
    async fn title_and_description_apply_to_first_file_only() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .part("images", image_part("a.png", tiny_png(3)))
            .part("images", image_part("team_photo.png", tiny_png(4)))
            .text("title", "Launch")
            .text("description", "Launch day");

        let res = app.post_form(routes::MEDIA, form).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 2);
        assert_eq!(res.body["images"][0]["title"], "Launch");
        assert_eq!(res.body["images"][1]["title"], "team photo");

        let second = res.body["images"][1]["id"].as_str().unwrap();
        let detail = app.get(&routes::media(second)).await;
        assert_eq!(detail.body["description"], "");
    }

    #[tokio::test]
    async fn reuploading_an_image_returns_the_existing_entry() {
        let app = TestApp::spawn().await;

        let first = app.upload(vec![("logo.png", tiny_png(5))]).await;
        let second = app.upload(vec![("logo-copy.png", tiny_png(5))]).await;

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        assert_eq!(second.body["count"], 1);
        assert_eq!(first.body["images"][0]["id"], second.body["images"][0]["id"]);
        assert_eq!(second.body["images"][0]["title"], "logo");
        assert_eq!(catalog_size(&app).await, 1);
    }

    #[tokio::test]
    async fn oversized_image_is_compressed_before_upload() {
        let app = TestApp::spawn().await;
        let input = noisy_png(256, 256);
        assert!(input.len() as u64 > TEST_MAX_BYTES);

        let res = app.upload(vec![("noise.png", input.clone())]).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let received = app.store.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert!(received[0] < input.len());
    }

    #[tokio::test]
    async fn small_image_is_sent_as_is() {
        let app = TestApp::spawn().await;
        let input = tiny_png(6);

        app.upload(vec![("small.png", input.clone())]).await;

        assert_eq!(*app.store.received.lock().unwrap(), vec![input.len()]);
    }

    #[tokio::test]
    async fn failing_file_does_not_stop_the_batch() {
        let app = TestApp::spawn().await;
        // Oversized, so it goes through the decoder and fails there.
        let garbage = vec![0x42u8; TEST_MAX_BYTES as usize + 1];

        let res = app
            .upload(vec![
                ("one.png", tiny_png(7)),
                ("broken.png", garbage),
                ("three.png", tiny_png(8)),
            ])
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["count"], 2);

        let errors = res.body["errors"].as_array().expect("errors list");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["filename"], "broken.png");
        assert!(
            errors[0]["error"]
                .as_str()
                .unwrap()
                .starts_with("failed to decode image")
        );
        assert_eq!(catalog_size(&app).await, 2);
    }

    #[tokio::test]
    async fn total_failure_reports_every_error() {
        let app = TestApp::spawn().await;

        let res = app.upload(vec![("bad.png", b"FAIL: not an image".to_vec())]).await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.body["success"], false);
        assert_eq!(
            res.body["error"],
            "image host rejected upload (400): Invalid image file"
        );
        let errors = res.body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["filename"], "bad.png");
        assert_eq!(catalog_size(&app).await, 0);
    }

    #[tokio::test]
    async fn non_image_files_are_rejected_per_file() {
        let app = TestApp::spawn().await;

        let res = app
            .upload(vec![("notes.pdf", b"%PDF-1.7".to_vec()), ("ok.png", tiny_png(9))])
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 1);
        assert_eq!(res.body["errors"][0]["filename"], "notes.pdf");
        assert_eq!(
            res.body["errors"][0]["error"],
            "unsupported file type: application/pdf"
        );
        assert_eq!(app.store.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn nameless_file_part_is_reported_by_position() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .part("images", image_part("ok.png", tiny_png(11)))
            .part("images", Part::bytes(b"FAIL: nameless".to_vec()));

        let res = app.post_form(routes::MEDIA, form).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 1);
        let errors = res.body["errors"].as_array().expect("errors list");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["filename"], "file 2");
        assert_eq!(
            errors[0]["error"],
            "image host rejected upload (400): Invalid image file"
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let form = Form::new().text("title", "Nothing attached");

        let res = app.post_form(routes::MEDIA, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "No image file provided");
    }

    #[tokio::test]
    async fn traversal_in_folder_is_rejected() {
        let app = TestApp::spawn().await;
        let form = Form::new()
            .part("images", image_part("a.png", tiny_png(10)))
            .text("folder", "uploads/../secrets");

        let res = app.post_form(routes::MEDIA, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.store.received.lock().unwrap().is_empty());
    }
}

mod listing {
    use super::*;

    async fn seed(app: &TestApp, count: u8) {
        let files = (0..count)
            .map(|i| (format!("img-{i:02}.png"), tiny_png(i)))
            .collect::<Vec<_>>();
        let res = app
            .upload(files.iter().map(|(n, b)| (n.as_str(), b.clone())).collect())
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], count as u64);
    }

    #[tokio::test]
    async fn twenty_five_images_span_two_pages() {
        let app = TestApp::spawn().await;
        seed(&app, 25).await;

        let page1 = app.get(&routes::media_page("1", "compact")).await;
        assert_eq!(page1.status, 200);
        assert_eq!(page1.body["images"].as_array().unwrap().len(), 24);
        assert_eq!(page1.body["images"][0]["title"], "img 24");
        let p = &page1.body["pagination"];
        assert_eq!(p["number"], 1);
        assert_eq!(p["num_pages"], 2);
        assert_eq!(p["has_next"], true);
        assert_eq!(p["has_previous"], false);
        assert_eq!(p["next_page_number"], 2);
        assert!(p["previous_page_number"].is_null());

        let page2 = app.get(&routes::media_page("2", "compact")).await;
        let images = page2.body["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["title"], "img 00");
        assert_eq!(page2.body["pagination"]["has_next"], false);
        assert_eq!(page2.body["pagination"]["has_previous"], true);
    }

    #[tokio::test]
    async fn out_of_range_pages_are_clamped() {
        let app = TestApp::spawn().await;
        seed(&app, 25).await;

        let beyond = app.get(&routes::media_page("99", "compact")).await;
        assert_eq!(beyond.body["pagination"]["number"], 2);

        let junk = app.get(&routes::media_page("abc", "compact")).await;
        assert_eq!(junk.status, 200);
        assert_eq!(junk.body["pagination"]["number"], 1);
    }

    #[tokio::test]
    async fn empty_catalog_is_one_empty_page() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::MEDIA).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["images"], serde_json::json!([]));
        assert_eq!(res.body["pagination"]["num_pages"], 1);
    }

    #[tokio::test]
    async fn compact_and_full_modes() {
        let app = TestApp::spawn().await;
        seed(&app, 1).await;

        let compact = app.get(&routes::media_page("1", "compact")).await;
        assert_eq!(
            keys(&compact.body["images"][0]),
            ["id", "original_url", "thumbnail_url", "title", "web_url"]
        );

        let legacy = app.get("/api/v1/media?format=json").await;
        assert_eq!(keys(&legacy.body["images"][0]), keys(&compact.body["images"][0]));

        let full = app.get(routes::MEDIA).await;
        let item = &full.body["images"][0];
        for key in ["description", "public_id", "folder", "width", "height", "file_size", "created_at", "updated_at"] {
            assert!(item.get(key).is_some(), "full mode is missing {key}");
        }
        assert_eq!(item["folder"], "uploads");
    }

    #[tokio::test]
    async fn title_filter_finds_exact_matches_only() {
        let app = TestApp::spawn().await;
        let res = app
            .upload(vec![
                ("logo.png", tiny_png(20)),
                ("logo-dark.png", tiny_png(21)),
                ("banner.png", tiny_png(22)),
            ])
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let found = app.get(&routes::media_titled("logo")).await;
        assert_eq!(found.status, 200);
        let images = found.body["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["title"], "logo");
        assert_eq!(found.body["pagination"]["num_pages"], 1);

        let missing = app.get(&routes::media_titled("poster")).await;
        assert_eq!(missing.body["images"], serde_json::json!([]));
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn delete_removes_the_catalog_entry() {
        let app = TestApp::spawn().await;
        let res = app.upload(vec![("gone.png", tiny_png(11))]).await;
        let id = res.body["images"][0]["id"].as_str().unwrap().to_string();

        let deleted = app.delete(&routes::media(&id)).await;
        assert_eq!(deleted.status, 204);

        let missing = app.get(&routes::media(&id)).await;
        assert_eq!(missing.status, 404);
        assert_eq!(missing.body["code"], "NOT_FOUND");

        let again = app.delete(&routes::media(&id)).await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::media("not-a-uuid")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
