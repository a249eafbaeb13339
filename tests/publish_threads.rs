// tests/publish_threads.rs
use std::time::Duration;

use deals_threads_poster::publish::threads::ThreadsPublisher;
use deals_threads_poster::publish::{Poster, QuotaStatus};
use mockito::{Matcher, Server};

fn publisher(server: &Server) -> ThreadsPublisher {
    ThreadsPublisher::new(reqwest::Client::new(), "1234".into(), "tok".into())
        .with_api_base(server.url())
        .with_publish_delay(Duration::ZERO)
}

fn q(k: &str, v: &str) -> Matcher {
    Matcher::UrlEncoded(k.into(), v.into())
}

async fn mock_publish(server: &mut Server, creation_id: &str) -> mockito::Mock {
    server
        .mock("POST", "/1234/threads_publish")
        .match_query(q("creation_id", creation_id))
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"id":"post-1"}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn text_post_creates_then_publishes() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("media_type", "TEXT"),
            q("text", "hello deals"),
        ]))
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"id":"c-1"}"#)
        .create_async()
        .await;
    let publish = mock_publish(&mut server, "c-1").await;

    let out = publisher(&server).post("hello deals", &[]).await.unwrap();
    assert_eq!(out.post_id.as_deref(), Some("post-1"));
    assert_eq!(out.mode, "text");
    create.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn single_image_post_sends_image_url() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("media_type", "IMAGE"),
            q("image_url", "https://i.redd.it/a.jpg"),
            q("text", "one pic"),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"c-img"}"#)
        .create_async()
        .await;
    let publish = mock_publish(&mut server, "c-img").await;

    let out = publisher(&server)
        .post("one pic", &["https://i.redd.it/a.jpg".to_string()])
        .await
        .unwrap();
    assert_eq!(out.mode, "image");
    create.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn carousel_drops_failed_child_and_keeps_order() {
    let mut server = Server::new_async().await;
    let mut children = Vec::new();
    for (url, status, body) in [
        ("https://i/1.jpg", 200, r#"{"id":"k1"}"#),
        ("https://i/2.jpg", 400, r#"{"error":{"message":"image too small"}}"#),
        ("https://i/3.jpg", 200, r#"{"id":"k3"}"#),
    ] {
        children.push(
            server
                .mock("POST", "/1234/threads")
                .match_query(Matcher::AllOf(vec![
                    q("media_type", "IMAGE"),
                    q("is_carousel_item", "true"),
                    q("image_url", url),
                ]))
                .with_status(status)
                .with_body(body)
                .create_async()
                .await,
        );
    }
    let carousel = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("media_type", "CAROUSEL"),
            q("children", "k1,k3"),
            q("text", "three pics"),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"car-1"}"#)
        .create_async()
        .await;
    let publish = mock_publish(&mut server, "car-1").await;

    let images: Vec<String> = (1..=3).map(|i| format!("https://i/{i}.jpg")).collect();
    let out = publisher(&server).post("three pics", &images).await.unwrap();

    assert_eq!(out.mode, "carousel");
    for c in &children {
        c.assert_async().await;
    }
    carousel.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn carousel_with_one_survivor_falls_back_to_single_image() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("is_carousel_item", "true"),
            q("image_url", "https://i/1.jpg"),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"k1"}"#)
        .create_async()
        .await;
    let _bad = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("is_carousel_item", "true"),
            q("image_url", "https://i/2.jpg"),
        ]))
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;
    let single = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("media_type", "IMAGE"),
            q("image_url", "https://i/1.jpg"),
            q("text", "fallback"),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"c-single"}"#)
        .create_async()
        .await;
    let publish = mock_publish(&mut server, "c-single").await;

    let images = vec!["https://i/1.jpg".to_string(), "https://i/2.jpg".to_string()];
    let out = publisher(&server).post("fallback", &images).await.unwrap();

    assert_eq!(out.mode, "image");
    single.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn carousel_with_no_survivors_falls_back_to_text() {
    let mut server = Server::new_async().await;
    let children = server
        .mock("POST", "/1234/threads")
        .match_query(q("is_carousel_item", "true"))
        .with_status(500)
        .with_body("upstream down")
        .expect(2)
        .create_async()
        .await;
    let text = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::AllOf(vec![
            q("media_type", "TEXT"),
            q("text", "words only"),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"c-text"}"#)
        .create_async()
        .await;
    let publish = mock_publish(&mut server, "c-text").await;

    let images = vec!["https://i/1.jpg".to_string(), "https://i/2.jpg".to_string()];
    let out = publisher(&server).post("words only", &images).await.unwrap();

    assert_eq!(out.mode, "text");
    assert_eq!(out.post_id.as_deref(), Some("post-1"));
    children.assert_async().await;
    text.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn rejected_container_surfaces_response_body() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid OAuth access token"}}"#)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/1234/threads_publish")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = publisher(&server).post("x", &[]).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("401"), "{msg}");
    assert!(msg.contains("Invalid OAuth access token"), "{msg}");
    publish.assert_async().await;
}

#[tokio::test]
async fn missing_id_is_a_failure() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/1234/threads")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id":"c-9"}"#)
        .create_async()
        .await;
    let _publish = server
        .mock("POST", "/1234/threads_publish")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"IN_PROGRESS"}"#)
        .create_async()
        .await;

    let err = publisher(&server).post("x", &[]).await.unwrap_err();
    assert!(format!("{err:#}").contains("no id"));
}

#[tokio::test]
async fn quota_is_read_from_publishing_limit() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/1234/threads_publishing_limit")
        .match_query(q("fields", "quota_usage,config"))
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"data":[{"quota_usage":230,"config":{"quota_total":250,"quota_duration":86400}}]}"#)
        .create_async()
        .await;

    let quota = publisher(&server).quota().await.unwrap();
    assert_eq!(quota, Some(QuotaStatus { usage: 230, total: 250 }));
    assert!(quota.unwrap().is_near_limit());
    m.assert_async().await;
}
