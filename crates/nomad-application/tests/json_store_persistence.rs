//! Chat history written through the JSON directory store.

use std::sync::Arc;

use async_trait::async_trait;
use nomad_application::{ChatSessionManager, ConversationService};
use nomad_core::chat::MessageRole;
use nomad_core::error::{NomadError, Result};
use nomad_core::identity::Identity;
use nomad_core::store::DocumentStore;
use nomad_core::travel::{
    CostOfLiving, Destination, PlanReply, SearchReply, TravelApi, TripPreferences,
};
use nomad_infrastructure::{DocumentChatRepository, JsonDirDocumentStore};
use tempfile::TempDir;

struct ThailandApi;

#[async_trait]
impl TravelApi for ThailandApi {
    async fn search(&self, query: &str, _session_id: Option<&str>) -> Result<SearchReply> {
        if query.contains("Thailand") {
            Ok(SearchReply {
                reply: "Here are two great options:".to_string(),
                destinations: Some(vec![
                    Destination::new("cm", "Chiang Mai", "Thailand", CostOfLiving::Low),
                    Destination::new("bkk", "Bangkok", "Thailand", CostOfLiving::Medium),
                ]),
            })
        } else {
            Ok(SearchReply::text("Hi! Where would you like to go?"))
        }
    }

    async fn generate_plan(
        &self,
        _destinations: &[Destination],
        _preferences: &TripPreferences,
    ) -> Result<PlanReply> {
        Err(NomadError::remote_api(None, "not used"))
    }
}

async fn manager(dir: &TempDir) -> Arc<ChatSessionManager> {
    let store: Arc<dyn DocumentStore> =
        Arc::new(JsonDirDocumentStore::new(dir.path()).await.unwrap());
    Arc::new(ChatSessionManager::new(Arc::new(DocumentChatRepository::new(
        store,
    ))))
}

#[tokio::test]
async fn test_conversation_survives_restart() {
    let dir = TempDir::new().unwrap();
    let user = Identity::authenticated("u1", Some("nomad@example.com".to_string()));

    let session_id = {
        let chat = manager(&dir).await;
        chat.load(&user).await.unwrap();
        let conversation = ConversationService::new(chat.clone(), Arc::new(ThailandApi));

        let travel = conversation.submit("Thailand on a budget").await.unwrap();
        let small_talk = conversation.submit("hello").await.unwrap();
        assert_eq!(travel.session_id, small_talk.session_id);
        assert!(travel.reply.is_travel());
        assert!(!small_talk.reply.is_travel());

        // Queued after every earlier write
        chat.rename_session(&travel.session_id, "Thailand")
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        travel.session_id
    };

    let chat = manager(&dir).await;
    chat.load(&user).await.unwrap();
    let session = chat.session(&session_id).await.expect("session reloaded");

    assert_eq!(session.title, "Thailand");
    let roles: Vec<_> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );
    assert!(session.messages[1].is_travel());
    assert!(!session.messages[3].is_travel());
    let names: Vec<_> = session
        .destinations
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Chiang Mai", "Bangkok"]);
}

#[tokio::test]
async fn test_guest_sessions_leave_no_files() {
    let dir = TempDir::new().unwrap();
    let chat = manager(&dir).await;
    chat.load(&Identity::guest("g1")).await.unwrap();

    let conversation = ConversationService::new(chat.clone(), Arc::new(ThailandApi));
    conversation.submit("hello").await.unwrap();

    assert!(!dir.path().join("users").exists());
}
