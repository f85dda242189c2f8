//! Wishlist store against a mocked favorites endpoint.

mod common;

use joigo::i18n::{t, Language};
use joigo::state::NoticeLevel;
use joigo::types::AppError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn favorites(ids: &[i64]) -> serde_json::Value {
    let tours: Vec<_> = ids
        .iter()
        .map(|id| common::tour_json(*id, &format!("Tour {}", id), json!("Tour gia đình"), "Hà Nội"))
        .collect();
    json!({ "favorites": tours })
}

#[tokio::test]
async fn test_signed_out_add_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = common::app(&server);
    let mut notices = app.notifications.subscribe();
    app.auth.init().await;

    let tour = joigo::Tour::from(joigo::models::TourRecord {
        id: "1".into(),
        title: "Hơi thở Xứ Đoài".into(),
        ..Default::default()
    });
    let err = app.wishlist.add(&tour).await.unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, t(Language::En, "wishlist_login_required"));
}

#[tokio::test]
async fn test_signed_out_refresh_clears_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(favorites(&[1])))
        .expect(0)
        .mount(&server)
        .await;

    let app = common::app(&server);
    app.auth.init().await;
    app.wishlist.refresh().await.unwrap();
    assert!(app.wishlist.tours().is_empty());
    assert!(!app.wishlist.is_loading());
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(header("authorization", common::bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(favorites(&[1, 2])))
        .expect(2)
        .mount(&server)
        .await;

    let app = common::signed_in_app(&server).await;
    app.wishlist.refresh().await.unwrap();
    let first = app.wishlist.tours();
    app.wishlist.refresh().await.unwrap();

    assert_eq!(first, app.wishlist.tours());
    assert!(app.wishlist.is_in_wishlist("2"));
    assert!(!app.wishlist.is_in_wishlist("3"));
}

#[tokio::test]
async fn test_add_resyncs_and_toasts_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({"tour_id": "2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(2)
        .mount(&server)
        .await;
    // The backend de-duplicates, so the list holds the tour once.
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(favorites(&[2])))
        .mount(&server)
        .await;

    let app = common::signed_in_app(&server).await;
    let mut notices = app.notifications.subscribe();
    let tour = joigo::Tour::from(joigo::models::TourRecord {
        id: "2".into(),
        title: "Làng gốm Bát Tràng".into(),
        ..Default::default()
    });

    app.wishlist.add(&tour).await.unwrap();
    app.wishlist.add(&tour).await.unwrap();

    let ids: Vec<String> = app.wishlist.tours().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["2"]);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert!(notice.message.contains("Làng gốm Bát Tràng"));
}

#[tokio::test]
async fn test_failed_remove_keeps_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(favorites(&[1, 2])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/favorites/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = common::signed_in_app(&server).await;
    app.wishlist.refresh().await.unwrap();
    let mut notices = app.notifications.subscribe();

    assert!(app.wishlist.remove("1").await.is_err());
    assert_eq!(app.wishlist.tours().len(), 2);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.message, t(Language::En, "wishlist_error"));
}

#[tokio::test]
async fn test_sign_in_triggers_refresh_through_listener() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(favorites(&[3])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chat/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = common::app(&server);
    app.auth.init().await;
    let _listeners = app.watch_auth();
    let mut rx = app.wishlist.subscribe();

    app.auth.sign_in(common::EMAIL, common::PASSWORD).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while !rx.borrow_and_update().tours.iter().any(|t| t.id == "3") {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("wishlist refreshed after sign-in");
}

#[tokio::test]
async fn test_refresh_in_flight_across_sign_out_stays_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(favorites(&[1]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let app = common::signed_in_app(&server).await;

    let (stale, _) = tokio::join!(app.wishlist.refresh(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.auth.sign_out().await.unwrap();
        app.wishlist.refresh().await.unwrap();
    });

    stale.unwrap();
    assert!(!app.auth.is_authenticated());
    assert!(app.wishlist.tours().is_empty());
    assert!(!app.wishlist.is_loading());
}

#[tokio::test]
async fn test_refresh_for_previous_user_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(favorites(&[1]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let app = common::signed_in_app(&server).await;

    let (stale, _) = tokio::join!(app.wishlist.refresh(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.auth.sign_out().await.unwrap();
    });

    stale.unwrap();
    assert!(app.wishlist.tours().is_empty());
    assert!(!app.wishlist.is_in_wishlist("1"));
    assert!(!app.wishlist.is_loading());
}
