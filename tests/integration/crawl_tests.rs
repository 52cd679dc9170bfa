//! End-to-end tests for the crawl driver
//!
//! A mock server plays the library site: listing pages, detail pages, text
//! downloads and cover images.

use super::{detail_page, hits, listing_page, stub_page, test_config};
use tempfile::TempDir;
use tululu_crawler::crawler::{run_crawl, Coordinator};
use tululu_crawler::{Catalog, TululuError};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOK_TEXT: &str = "Мой дядя самых честных правил";
const COVER_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status).insert_header("Location", "/"))
        .mount(server)
        .await;
}

async fn mount_artifacts(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_TEXT))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/shots/{}.jpg", id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(COVER_BYTES))
        .mount(server)
        .await;
}

fn page_url(server: &MockServer, page_path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page_path)).expect("Failed to build page URL")
}

#[tokio::test]
async fn test_full_crawl_writes_artifacts_and_catalog() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    // One downloadable book, one stub without a text link, one removed book
    mount_page(&mock_server, "/l55/1", listing_page(&["/b7/", "/b8/", "/b9/"])).await;
    mount_redirect(&mock_server, "/l55/2", 301).await;
    mount_page(
        &mock_server,
        "/b7/",
        detail_page("Евгений Онегин", "Пушкин Александр", 7),
    )
    .await;
    mount_page(&mock_server, "/b8/", stub_page("Заглушка")).await;
    mount_redirect(&mock_server, "/b9/", 302).await;
    mount_artifacts(&mock_server, "7").await;

    let config = test_config(&mock_server.uri(), dest.path());
    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.catalog.len(), 1);
    let record = &report.catalog.records()[0];
    assert_eq!(record.title, "Евгений Онегин");
    assert_eq!(record.author, "Пушкин Александр");
    assert_eq!(record.comments, vec!["Отличная книга"]);
    assert_eq!(record.genres, vec!["Научная фантастика"]);

    let book_path = dest.path().join("books").join("7 Евгений Онегин.txt");
    let img_path = dest.path().join("images").join("7 7.jpg");
    assert_eq!(record.book_path.as_deref(), Some(book_path.as_path()));
    assert_eq!(record.img_src.as_deref(), Some(img_path.as_path()));
    assert_eq!(
        std::fs::read_to_string(&book_path).expect("Text should be written"),
        BOOK_TEXT
    );
    assert_eq!(
        std::fs::read(&img_path).expect("Cover should be written"),
        COVER_BYTES
    );

    // Only the downloadable book produced files
    let books: Vec<_> = std::fs::read_dir(dest.path().join("books"))
        .expect("Books dir should exist")
        .collect();
    assert_eq!(books.len(), 1);

    let written = Catalog::read_json(&dest.path().join("books.json")).expect("Catalog written");
    assert_eq!(written, report.catalog);

    let stats = &report.statistics;
    assert_eq!(stats.listing_pages, 1);
    assert_eq!(stats.detail_urls, 3);
    assert_eq!(stats.books_saved, 1);
    assert_eq!(stats.skipped_no_download, 1);
    assert_eq!(stats.absent, 1);
    assert_eq!(stats.given_up, 0);
    assert_eq!(stats.texts_written, 1);
    assert_eq!(stats.images_written, 1);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_skip_flags_download_nothing() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_page(&mock_server, "/l55/1", listing_page(&["/b7/"])).await;
    mount_redirect(&mock_server, "/l55/2", 301).await;
    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_TEXT))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/7.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(COVER_BYTES))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri(), dest.path());
    config.crawl.skip_images = true;
    config.crawl.skip_text = true;

    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.catalog.len(), 1);
    let record = &report.catalog.records()[0];
    assert_eq!(record.title, "Книга");
    assert!(record.book_path.is_none());
    assert!(record.img_src.is_none());

    let books = std::fs::read_dir(dest.path().join("books")).expect("Books dir should exist");
    assert_eq!(books.count(), 0);
    let images = std::fs::read_dir(dest.path().join("images")).expect("Images dir should exist");
    assert_eq!(images.count(), 0);

    // The catalog records absent paths as null
    let json = std::fs::read_to_string(dest.path().join("books.json")).expect("Catalog written");
    assert!(json.contains("\"book_path\": null"));
    assert!(json.contains("\"img_src\": null"));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    // Two server errors, then the page
    Mock::given(method("GET"))
        .and(path("/b7/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;
    mount_artifacts(&mock_server, "7").await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator
        .process_url(&page_url(&mock_server, "/b7/"))
        .await
        .expect("Record after retries");

    assert_eq!(record.title, "Книга");
    assert_eq!(hits(&mock_server, "/b7/").await, 3);
    assert_eq!(coordinator.statistics().retries, 2);
    assert_eq!(coordinator.statistics().books_saved, 1);
}

#[tokio::test]
async fn test_gives_up_past_ceiling_and_moves_on() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/b1/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/b2/", detail_page("Вторая", "Автор", 2)).await;
    mount_artifacts(&mock_server, "2").await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let first = coordinator.process_url(&page_url(&mock_server, "/b1/")).await;
    let second = coordinator.process_url(&page_url(&mock_server, "/b2/")).await;

    assert!(first.is_none());
    assert_eq!(second.expect("Second book should be saved").title, "Вторая");

    // Delays of 10ms and 20ms fit under the 25ms ceiling, the third does not
    assert_eq!(hits(&mock_server, "/b1/").await, 3);
    assert_eq!(coordinator.statistics().given_up, 1);
    assert_eq!(coordinator.statistics().books_saved, 1);
}

#[tokio::test]
async fn test_redirected_detail_page_is_absent() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_redirect(&mock_server, "/b404/", 302).await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator
        .process_url(&page_url(&mock_server, "/b404/"))
        .await;

    assert!(record.is_none());
    // Absence is not retried
    assert_eq!(hits(&mock_server, "/b404/").await, 1);
    assert_eq!(coordinator.statistics().absent, 1);
    assert_eq!(coordinator.statistics().retries, 0);
}

#[tokio::test]
async fn test_malformed_heading_skips_book() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_page(
        &mock_server,
        "/b5/",
        r#"<html><body><h1>Без автора</h1>
        <table class="d_book"><tr><td><a href="/txt.php?id=5">скачать txt</a></td></tr></table>
        </body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOK_TEXT))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator.process_url(&page_url(&mock_server, "/b5/")).await;

    assert!(record.is_none());
    assert_eq!(hits(&mock_server, "/b5/").await, 1);
    assert_eq!(coordinator.statistics().extraction_failures, 1);
}

#[tokio::test]
async fn test_redirected_download_leaves_artifact_absent() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/7.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(COVER_BYTES))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator
        .process_url(&page_url(&mock_server, "/b7/"))
        .await
        .expect("Record should still be emitted");

    assert!(record.book_path.is_none());
    assert!(record.img_src.is_some());
    assert_eq!(coordinator.statistics().texts_written, 0);
    assert_eq!(coordinator.statistics().images_written, 1);
}

#[tokio::test]
async fn test_setup_failure_aborts_before_fetching() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    // A regular file where the destination folder should be
    let blocker = dest.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").expect("Failed to write blocker");

    let mut config = test_config(&mock_server.uri(), dest.path());
    config.output.dest_folder = blocker;

    let result = run_crawl(config).await;
    assert!(matches!(result, Err(TululuError::Setup { .. })));
}

#[tokio::test]
async fn test_refused_write_leaves_artifact_absent() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;
    mount_artifacts(&mock_server, "7").await;

    // A directory occupies the text's filename, so writing the file fails
    std::fs::create_dir_all(dest.path().join("books").join("7 Книга.txt"))
        .expect("Failed to create blocking directory");

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator
        .process_url(&page_url(&mock_server, "/b7/"))
        .await
        .expect("Record should still be emitted");

    assert_eq!(record.title, "Книга");
    assert!(record.book_path.is_none());
    assert_eq!(
        record.img_src.as_deref(),
        Some(dest.path().join("images").join("7 7.jpg").as_path())
    );
    assert_eq!(coordinator.statistics().books_saved, 1);
    assert_eq!(coordinator.statistics().texts_written, 0);
    assert_eq!(coordinator.statistics().images_written, 1);
}

#[tokio::test]
async fn test_failed_download_retries_whole_page() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;

    // The cover fails once, then is served
    Mock::given(method("GET"))
        .and(path("/shots/7.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_artifacts(&mock_server, "7").await;

    let config = test_config(&mock_server.uri(), dest.path());
    let mut coordinator = Coordinator::new(config).expect("Coordinator should build");

    let record = coordinator
        .process_url(&page_url(&mock_server, "/b7/"))
        .await
        .expect("Record after retry");

    assert!(record.book_path.is_some());
    assert!(record.img_src.is_some());
    assert_eq!(hits(&mock_server, "/b7/").await, 2);
    assert_eq!(hits(&mock_server, "/shots/7.jpg").await, 2);
    assert_eq!(coordinator.statistics().retries, 1);
    assert_eq!(coordinator.statistics().books_saved, 1);
}

#[tokio::test]
async fn test_skipped_listing_page_is_counted() {
    let mock_server = MockServer::start().await;
    let dest = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/l55/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/l55/2", listing_page(&["/b7/"])).await;
    mount_redirect(&mock_server, "/l55/3", 301).await;
    mount_page(&mock_server, "/b7/", detail_page("Книга", "Автор", 7)).await;
    mount_artifacts(&mock_server, "7").await;

    let config = test_config(&mock_server.uri(), dest.path());
    let report = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(report.catalog.len(), 1);
    assert_eq!(report.statistics.listing_pages, 1);
    assert_eq!(report.statistics.listing_pages_given_up, 1);
}
