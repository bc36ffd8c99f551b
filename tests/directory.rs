#[cfg(feature = "server")]
mod directory_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use sealpost::compose::{ComposeSession, LookupOutcome, Phase};
    use sealpost::crypto::armor;
    use sealpost::directory::http::HttpDirectory;
    use sealpost::directory::Directory;
    use sealpost::error::{ComposeError, LookupError};
    use sealpost::keys::identity::AuthorIdentity;
    use sealpost::notify::{Notice, RecordingSink};
    use sealpost::server::handlers::DirectoryState;
    use sealpost::server::registry::Registry;
    use sealpost::session::{Credentials, Session, SessionContext};

    struct Fixture {
        url: String,
        state: Arc<DirectoryState>,
        author: AuthorIdentity,
        alice: Vec<AuthorIdentity>,
    }

    /// Start a directory on a random port with an author and a two-key alice.
    async fn start_directory() -> Fixture {
        let author = AuthorIdentity::generate();
        let alice = vec![AuthorIdentity::generate(), AuthorIdentity::generate()];

        let registry = format!(
            r#"
[[person]]
id = "p-me"
email = "me@example.com"

[[person.key]]
key = "{me}"

[[person]]
id = "p-alice"
email = "alice@example.com"

[[person.key]]
id = "alice-laptop"
key = "{a1}"

[[person.key]]
id = "alice-phone"
key = "{a2}"

[[session]]
id = "s-me"
person = "p-me"
verified = true

[[session]]
id = "s-alice"
person = "p-alice"
verified = true
"#,
            me = author.public_key(),
            a1 = alice[0].public_key(),
            a2 = alice[1].public_key(),
        );

        let state = Arc::new(DirectoryState::new(Registry::from_toml(&registry).unwrap()));
        let app = sealpost::server::build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        Fixture {
            url: format!("http://127.0.0.1:{}", port),
            state,
            author,
            alice,
        }
    }

    fn client(url: &str, session_id: &str) -> HttpDirectory {
        client_as(url, "p-me", session_id)
    }

    fn client_as(url: &str, person_id: &str, session_id: &str) -> HttpDirectory {
        HttpDirectory::new(
            url,
            Credentials {
                person_id: person_id.to_string(),
                session_id: session_id.to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn session(fixture: &Fixture) -> Session {
        Session::start(SessionContext {
            credentials: Credentials {
                person_id: "p-me".to_string(),
                session_id: "s-me".to_string(),
            },
            author: "me@example.com".to_string(),
            author_keys: vec![fixture.author.directory_key()],
        })
    }

    #[tokio::test]
    async fn lookup_returns_every_key() {
        let fixture = start_directory().await;
        let keys = client(&fixture.url, "s-me")
            .lookup("Alice@Example.com")
            .await
            .unwrap();

        let ids: Vec<&str> = keys.iter().map(|k| k.key_id.as_str()).collect();
        assert_eq!(ids, vec!["alice-laptop", "alice-phone"]);
    }

    #[tokio::test]
    async fn lookup_of_unknown_person_is_empty() {
        let fixture = start_directory().await;
        let keys = client(&fixture.url, "s-me")
            .lookup("nobody@example.com")
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn missing_key_id_is_derived() {
        let fixture = start_directory().await;
        let keys = client(&fixture.url, "s-me")
            .lookup("me@example.com")
            .await
            .unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0], fixture.author.directory_key());
    }

    #[tokio::test]
    async fn stale_session_is_session_expired() {
        let fixture = start_directory().await;
        let err = client(&fixture.url, "stale")
            .lookup("alice@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, LookupError::SessionExpired);
    }

    #[tokio::test]
    async fn unreachable_directory_is_a_directory_error() {
        let err = client("http://127.0.0.1:9", "s-me")
            .lookup("alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Directory(_)));
    }

    #[tokio::test]
    async fn compose_encrypt_and_post() {
        let fixture = start_directory().await;
        let directory = client(&fixture.url, "s-me");
        let sink = RecordingSink::new();
        let mut session = session(&fixture);

        let submission = {
            let mut compose = ComposeSession::new(&mut session, &directory, &sink);
            let outcome = compose.lookup("alice@example.com").await.unwrap();
            assert!(matches!(outcome, LookupOutcome::Found { .. }));

            compose.edit_message("the eagle has landed").unwrap();
            compose.encrypt().await.unwrap();
            assert_eq!(compose.state().phase, Phase::EncryptedReady);
            compose.submit().unwrap()
        };

        assert!(submission.encrypted);
        assert_eq!(submission.recipients, vec!["alice@example.com"]);

        // Both of alice's keys and the author's key can read it.
        for identity in fixture.alice.iter().chain(std::iter::once(&fixture.author)) {
            let plaintext = armor::open(&submission.message, &identity.age_identity).unwrap();
            assert_eq!(plaintext, "the eagle has landed");
        }

        let reply = directory.post_message(&submission).await.unwrap();
        assert_eq!(reply, "Your message has been posted");

        let posted = fixture.state.posted().await;
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].message, submission.message);
        assert_eq!(posted[0].recipients, vec!["alice@example.com"]);
        assert!(sink.notices().is_empty());
    }

    #[tokio::test]
    async fn expired_session_prompts_for_a_new_one() {
        let fixture = start_directory().await;
        let directory = client(&fixture.url, "stale");
        let sink = RecordingSink::new();
        let mut session = session(&fixture);
        let mut compose = ComposeSession::new(&mut session, &directory, &sink);

        let err = compose.lookup("alice@example.com").await.unwrap_err();
        assert!(err.is_session_expired());
        assert!(matches!(err, ComposeError::Lookup(_)));
        assert!(compose.recipients().is_empty());
        assert_eq!(compose.state().phase, Phase::Ready);
        assert!(compose.state().recipient_input_enabled);

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            &notices[0],
            Notice::Confirm { continue_target, .. } if continue_target == "/session"
        ));
    }

    #[tokio::test]
    async fn post_with_stale_session_fails() {
        let fixture = start_directory().await;
        let submission = sealpost::compose::Submission {
            message: "hi".to_string(),
            recipients: vec!["alice@example.com".to_string()],
            encrypted: false,
        };
        let err = client(&fixture.url, "stale")
            .post_message(&submission)
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("Session is expired or invalid"));
        assert!(fixture.state.posted().await.is_empty());
    }

    #[tokio::test]
    async fn posted_message_reaches_recipient_inbox() {
        let fixture = start_directory().await;
        let directory = client(&fixture.url, "s-me");
        let sink = RecordingSink::new();
        let mut session = session(&fixture);

        let submission = {
            let mut compose = ComposeSession::new(&mut session, &directory, &sink);
            compose.lookup("alice@example.com").await.unwrap();
            compose.edit_message("see you at the usual place").unwrap();
            compose.encrypt().await.unwrap();
            compose.submit().unwrap()
        };
        directory.post_message(&submission).await.unwrap();

        let inbox = client_as(&fixture.url, "p-alice", "s-alice")
            .latest_messages()
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].author, "me@example.com");
        assert_eq!(inbox[0].recipients, vec!["alice@example.com"]);
        let plaintext = armor::open(&inbox[0].message, &fixture.alice[1].age_identity).unwrap();
        assert_eq!(plaintext, "see you at the usual place");

        // The author sees their own post and can still read it.
        let sent = directory.latest_messages().await.unwrap();
        assert_eq!(sent.len(), 1);
        let plaintext = armor::open(&sent[0].message, &fixture.author.age_identity).unwrap();
        assert_eq!(plaintext, "see you at the usual place");
    }

    #[tokio::test]
    async fn listing_with_stale_session_fails() {
        let fixture = start_directory().await;
        let err = client(&fixture.url, "stale")
            .latest_messages()
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("Session is expired or invalid"));
    }
}
