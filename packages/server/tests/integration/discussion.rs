use serde_json::json;

use crate::common::{TestApp, column, routes};

mod topics {
    use super::*;

    #[tokio::test]
    async fn create_and_get_topic() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::TOPICS,
                &json!({"subject": "Exam date?", "message": "When is it?", "author": "Ada"}),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.get(&routes::topic(res.id())).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.data()["subject"], "Exam date?");
        assert_eq!(res.data()["author"], "Ada");
    }

    #[tokio::test]
    async fn list_defaults_to_newest_first() {
        let app = TestApp::spawn().await;
        app.create_topic("first", "Ada").await;
        app.create_topic("second", "Alan").await;
        app.create_topic("third", "Grace").await;

        let res = app.get(routes::TOPICS).await;
        assert_eq!(column(res.items(), "subject"), vec!["third", "second", "first"]);

        let res = app.get("/api/discussion?resource=topics&sort=author&order=asc").await;
        assert_eq!(column(res.items(), "author"), vec!["Ada", "Alan", "Grace"]);

        let res = app.get("/api/discussion?resource=topics&sort=nonsense&order=asc").await;
        assert_eq!(column(res.items(), "subject"), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn search_covers_author() {
        let app = TestApp::spawn().await;
        app.create_topic("Homework", "Grace").await;
        app.create_topic("Lecture", "Alan").await;

        let res = app.get("/api/discussion?resource=topics&search=grace").await;
        assert_eq!(column(res.items(), "subject"), vec!["Homework"]);
    }

    #[tokio::test]
    async fn update_changes_subject_and_message_only() {
        let app = TestApp::spawn().await;
        let id = app.create_topic("Old", "Ada").await;

        let res = app
            .put(
                "/api/discussion?resource=topics",
                &json!({"id": id, "subject": "New", "author": "Mallory"}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["subject"], "New");
        assert_eq!(res.data()["author"], "Ada");

        let res = app
            .put("/api/discussion?resource=topics", &json!({"id": id, "author": "Mallory"}))
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn missing_required_fields() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::TOPICS, &json!({"subject": "S", "message": "M"}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing required fields");
    }
}

mod replies {
    use super::*;

    #[tokio::test]
    async fn replies_listed_oldest_first() {
        let app = TestApp::spawn().await;
        let topic = app.create_topic("Q", "Ada").await;
        app.create_reply(topic, "a").await;
        app.create_reply(topic, "b").await;

        let res = app.get(&routes::replies(topic)).await;
        assert_eq!(res.status, 200);
        assert_eq!(column(res.items(), "text"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn reply_to_missing_topic_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::REPLIES, &json!({"topic_id": 5, "author": "Alan", "text": "hi"}))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Topic not found");
    }

    #[tokio::test]
    async fn replies_cannot_be_updated() {
        let app = TestApp::spawn().await;
        let topic = app.create_topic("Q", "Ada").await;
        let reply = app.create_reply(topic, "a").await;

        let res = app
            .put(routes::REPLIES, &json!({"id": reply, "text": "edited"}))
            .await;
        assert_eq!(res.status, 405);
    }

    #[tokio::test]
    async fn delete_reply_then_topic_cascade() {
        let app = TestApp::spawn().await;
        let topic = app.create_topic("Q", "Ada").await;
        let first = app.create_reply(topic, "a").await;
        let second = app.create_reply(topic, "b").await;

        let res = app.delete(&routes::reply(first)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["message"], "Reply deleted");

        let res = app.delete(&routes::topic(topic)).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.delete(&routes::reply(second)).await;
        assert_eq!(res.status, 404);

        let res = app.get(&routes::replies(topic)).await;
        assert!(res.items().is_empty());
    }
}

mod resource_discriminator {
    use super::*;

    #[tokio::test]
    async fn resource_is_required_and_validated() {
        let app = TestApp::spawn().await;

        let res = app.get("/api/discussion").await;
        assert_eq!(res.status, 400);

        let res = app.get("/api/discussion?resource=polls").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}
